use alloy_primitives::{Address, B256, Bytes, U256};

/// A block with the rollup's L1 batch fields.
///
/// `T` is either the transaction hash or the full [`super::Transaction`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<T> {
    /// Hash of the block, `None` when pending
    #[serde(default)]
    pub hash: Option<B256>,
    /// Hash of the parent block
    pub parent_hash: B256,
    /// Number of the block, `None` when pending
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub number: Option<u64>,
    /// Timestamp in seconds
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// Number of the containing L1 batch, `None` until the batch is sealed
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_number: Option<u64>,
    /// Timestamp of the containing L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_timestamp: Option<u64>,
    /// Gas limit of the block
    #[serde(default)]
    pub gas_limit: U256,
    /// Gas used by the block
    #[serde(default)]
    pub gas_used: U256,
    /// Operator address
    #[serde(default)]
    pub miner: Address,
    /// Extra data
    #[serde(default)]
    pub extra_data: Bytes,
    /// Base fee per gas
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    /// Transactions of the block
    #[serde(default = "Vec::new")]
    pub transactions: Vec<T>,
}
