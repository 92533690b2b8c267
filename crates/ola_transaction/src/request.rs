//! Loosely specified transaction, as provided by callers before signing.

use alloy_primitives::{Address, Bytes, U256};

use crate::meta::Eip712Meta;

/// A transaction request with optional fields.
///
/// Omitted fields fall back to protocol defaults when the request is
/// hashed or encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Transaction type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<u8>,
    /// Sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Gas limit
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub gas_limit: Option<u64>,
    /// Legacy gas price
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub gas_price: Option<u128>,
    /// Maximum fee per gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub max_fee_per_gas: Option<u128>,
    /// Maximum priority fee per gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub max_priority_fee_per_gas: Option<u128>,
    /// Nonce
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub nonce: Option<u64>,
    /// Transferred value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Calldata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Chain ID
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub chain_id: Option<u64>,
    /// Rollup-specific extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Eip712Meta>,
}

impl TransactionRequest {
    /// Returns the effective maximum fee per gas, falling back to the gas
    /// price.
    pub fn effective_max_fee_per_gas(&self) -> u128 {
        self.max_fee_per_gas.or(self.gas_price).unwrap_or(0)
    }

    /// Returns the effective maximum priority fee per gas, falling back to
    /// the maximum fee per gas.
    pub fn effective_max_priority_fee_per_gas(&self) -> u128 {
        self.max_priority_fee_per_gas
            .unwrap_or_else(|| self.effective_max_fee_per_gas())
    }
}
