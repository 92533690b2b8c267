use alloy_primitives::{Address, B256, Bytes};

use crate::bytecode::{BytecodeHashError, hash_bytecode};

/// The gas per pubdata byte limit that is used when none is specified.
pub const DEFAULT_GAS_PER_PUBDATA_LIMIT: u64 = 50_000;

/// Paymaster that pays for the execution of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterParams {
    /// Address of the paymaster contract
    pub paymaster: Address,
    /// Input passed to the paymaster
    pub paymaster_input: Bytes,
}

/// Rollup-specific extension of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Meta {
    /// Maximum gas the sender pays per byte of published data
    #[serde(default = "default_gas_per_pubdata")]
    pub gas_per_pubdata: u64,
    /// Bytecodes of contracts that are deployed by the transaction
    #[serde(default)]
    pub factory_deps: Vec<Bytes>,
    /// Signature that replaces the ECDSA signature of the sender
    #[serde(default)]
    pub custom_signature: Option<Bytes>,
    /// Paymaster that pays for the transaction
    #[serde(default)]
    pub paymaster_params: Option<PaymasterParams>,
}

impl Eip712Meta {
    /// Computes the versioned hashes of the factory dependencies, in order.
    pub fn factory_dep_hashes(&self) -> Result<Vec<B256>, BytecodeHashError> {
        self.factory_deps
            .iter()
            .map(|bytecode| hash_bytecode(bytecode))
            .collect()
    }
}

impl Default for Eip712Meta {
    fn default() -> Self {
        Self {
            gas_per_pubdata: DEFAULT_GAS_PER_PUBDATA_LIMIT,
            factory_deps: Vec::new(),
            custom_signature: None,
            paymaster_params: None,
        }
    }
}

fn default_gas_per_pubdata() -> u64 {
    DEFAULT_GAS_PER_PUBDATA_LIMIT
}
