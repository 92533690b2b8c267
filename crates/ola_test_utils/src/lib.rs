//! Test helpers shared by the workspace crates.

/// Scripted in-memory JSON-RPC transport
pub mod mock_transport;
/// Helpers for handling secret keys in tests
pub mod secret_key;

pub use self::mock_transport::MockTransport;
