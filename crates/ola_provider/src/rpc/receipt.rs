use alloy_primitives::{Address, B256, Bloom, U256};

use super::{L2ToL1Log, Log};

/// A transaction receipt with the rollup's L1 batch fields.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the transaction
    pub transaction_hash: B256,
    /// Index of the transaction within the block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub transaction_index: Option<u64>,
    /// Hash of the containing block
    #[serde(default)]
    pub block_hash: Option<B256>,
    /// Number of the containing block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
    /// Number of the containing L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_number: Option<u64>,
    /// Index of the transaction within the L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_tx_index: Option<u64>,
    /// Sender
    #[serde(default)]
    pub from: Option<Address>,
    /// Recipient
    #[serde(default)]
    pub to: Option<Address>,
    /// Address of the deployed contract, if any
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Gas used by the transaction
    #[serde(default)]
    pub gas_used: Option<U256>,
    /// Gas used by the block up to and including the transaction
    #[serde(default)]
    pub cumulative_gas_used: Option<U256>,
    /// Gas price that was paid
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
    /// Logs emitted by the transaction
    #[serde(default)]
    pub logs: Vec<Log>,
    /// Messages sent to L1 by the transaction
    #[serde(default, rename = "l2ToL1Logs")]
    pub l2_to_l1_logs: Vec<L2ToL1Log>,
    /// Bloom filter of the logs
    #[serde(default)]
    pub logs_bloom: Option<Bloom>,
    /// Execution status: 1 for success, 0 for failure
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub status: Option<u64>,
    /// Transaction type
    #[serde(default, rename = "type", with = "alloy_serde::quantity::opt")]
    pub transaction_type: Option<u64>,
    /// Number of blocks mined on top of the containing block, including it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub confirmations: Option<u64>,
}

impl TransactionReceipt {
    /// Whether the transaction was rejected before being included in a block.
    ///
    /// Such receipts have no block number and a failed status.
    pub fn is_rejected(&self) -> bool {
        self.block_number.is_none() && self.status == Some(0)
    }
}
