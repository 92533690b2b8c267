use alloy_primitives::{Address, B256, Bytes};

/// A log emitted by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Address of the emitting contract
    pub address: Address,
    /// Indexed topics
    pub topics: Vec<B256>,
    /// Non-indexed data
    pub data: Bytes,
    /// Hash of the containing block
    #[serde(default)]
    pub block_hash: Option<B256>,
    /// Number of the containing block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
    /// Number of the containing L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_number: Option<u64>,
    /// Hash of the emitting transaction
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    /// Index of the emitting transaction within the block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub transaction_index: Option<u64>,
    /// Index of the log within the block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub log_index: Option<u64>,
    /// Whether the log was removed due to a reorganisation
    #[serde(default)]
    pub removed: bool,
}

/// A message sent from L2 to L1.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct L2ToL1Log {
    /// Number of the containing block
    #[serde(with = "alloy_serde::quantity")]
    pub block_number: u64,
    /// Hash of the containing block
    pub block_hash: B256,
    /// Number of the containing L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_number: Option<u64>,
    /// Index of the sending transaction within the block
    #[serde(with = "alloy_serde::quantity")]
    pub transaction_index: u64,
    /// Shard of the message
    #[serde(with = "alloy_serde::quantity")]
    pub shard_id: u64,
    /// Whether the message was sent by the system
    pub is_service: bool,
    /// Sender of the message
    pub sender: Address,
    /// Message key
    pub key: B256,
    /// Message value
    pub value: B256,
    /// Hash of the sending transaction
    pub transaction_hash: B256,
    /// Index of the sending transaction within the L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub tx_index_in_l1_batch: Option<u64>,
    /// Index of the message within the block
    #[serde(with = "alloy_serde::quantity")]
    pub log_index: u64,
}
