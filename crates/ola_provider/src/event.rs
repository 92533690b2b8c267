use alloy_primitives::B256;

use crate::{
    rpc::{Log, TransactionReceipt},
    watch::WatchId,
};

/// An event published by the poll engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A poll cycle fetched the chain head.
    Poll {
        /// Process-wide identifier of the poll cycle
        poll_id: u64,
        /// Chain head observed by the cycle
        block_number: u64,
    },
    /// All work of a poll cycle has settled.
    DidPoll {
        /// Identifier of the settled poll cycle
        poll_id: u64,
    },
    /// A new block was observed.
    Block(u64),
    /// The receipt of a watched transaction became available.
    Transaction {
        /// Hash of the watched transaction
        hash: B256,
        /// Receipt of the transaction
        receipt: Box<TransactionReceipt>,
    },
    /// A log matching a watched filter was observed.
    Log {
        /// Watch that requested the log
        watch_id: WatchId,
        /// Delivery key of the watched filter
        filter_key: String,
        /// Matching log
        log: Box<Log>,
    },
    /// A background lookup failed or the chain head behaved unexpectedly.
    Error(PollError),
}

/// The kind of lookup that failed in the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    BlockNumber,
    Receipt,
    Logs,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LookupKind::BlockNumber => "block number",
            LookupKind::Receipt => "transaction receipt",
            LookupKind::Logs => "logs",
        })
    }
}

/// Failure observed during a poll cycle.
///
/// Background failures are never returned to callers; they are only
/// published as [`ProviderEvent::Error`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The chain head jumped by more than the skew threshold.
    #[error("block skew detected: {previous_block_number} -> {block_number}")]
    BlockSkew {
        /// Newly observed head
        block_number: u64,
        /// Last head for which block events were published
        previous_block_number: u64,
    },
    /// A lookup failed.
    #[error("failed to fetch {kind}: {message}")]
    Lookup {
        /// Kind of the failed lookup
        kind: LookupKind,
        /// Rendered error
        message: String,
    },
}

impl PollError {
    pub(crate) fn lookup(kind: LookupKind, error: &impl std::fmt::Display) -> Self {
        Self::Lookup {
            kind,
            message: error.to_string(),
        }
    }
}
