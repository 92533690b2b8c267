use alloy_primitives::{Address, B256, Bytes, U256};

/// A transaction as returned by the node, with the rollup's L1 batch fields.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Hash of the transaction
    pub hash: B256,
    /// Nonce of the sender
    #[serde(with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// Hash of the containing block
    #[serde(default)]
    pub block_hash: Option<B256>,
    /// Number of the containing block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
    /// Index of the transaction within the block
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub transaction_index: Option<u64>,
    /// Number of the containing L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_number: Option<u64>,
    /// Index of the transaction within the L1 batch
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub l1_batch_tx_index: Option<u64>,
    /// Sender
    pub from: Address,
    /// Recipient
    #[serde(default)]
    pub to: Option<Address>,
    /// Transferred value
    #[serde(default)]
    pub value: U256,
    /// Legacy gas price
    #[serde(default)]
    pub gas_price: Option<U256>,
    /// Maximum fee per gas
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    /// Maximum priority fee per gas
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
    /// Gas limit
    #[serde(default)]
    pub gas: U256,
    /// Calldata
    #[serde(default)]
    pub input: Bytes,
    /// Chain ID
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub chain_id: Option<u64>,
    /// Transaction type
    #[serde(default, rename = "type", with = "alloy_serde::quantity::opt")]
    pub transaction_type: Option<u64>,
}
