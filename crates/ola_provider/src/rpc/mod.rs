//! Rollup-specific shapes of JSON-RPC results.

mod block;
mod details;
mod log;
mod receipt;
mod transaction;

pub use self::{
    block::Block,
    details::{BatchDetails, BlockDetails, BridgeAddresses, BridgeContracts, TransactionDetails},
    log::{L2ToL1Log, Log},
    receipt::TransactionReceipt,
    transaction::Transaction,
};
