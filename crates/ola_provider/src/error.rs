use alloy_primitives::B256;
use ola_rpc_client::RpcClientError;
use ola_transaction::CodecError;

/// An error that occurs when calling into an [`crate::OlaProvider`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Failed to encode or decode a transaction.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The configured HTTP headers are invalid.
    #[error("Invalid HTTP header: {0}")]
    InvalidHttpHeaders(String),
    /// The request parameters could not be serialized.
    #[error("Failed to serialize request parameters: {0}")]
    InvalidRequest(serde_json::Error),
    /// The node returned a value of an unexpected shape.
    #[error("Bad result from backend ({method}): {value}")]
    InvalidResponse {
        /// The called method
        method: &'static str,
        /// The returned value
        value: serde_json::Value,
        /// The deserialization error
        #[source]
        error: serde_json::Error,
    },
    /// The JSON-RPC request failed.
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
    /// Fetching the chain head exceeded its time budget.
    #[error("Timed out fetching the block number")]
    Timeout,
    /// The node reported a different hash than the one computed locally.
    #[error("Transaction hash mismatch from backend: expected {expected}, got {actual}")]
    TransactionHashMismatch {
        /// Hash computed from the submitted envelope
        expected: B256,
        /// Hash returned by the node
        actual: B256,
    },
}
