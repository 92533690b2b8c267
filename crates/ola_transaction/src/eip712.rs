//! Typed-data representation of rollup transactions.

use std::borrow::Cow;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};

pub use self::schema::Transaction;
use crate::{
    EIP712_TX_TYPE, bytecode::BytecodeHashError, error::CodecError,
    request::TransactionRequest,
};

/// Name of the typed-data domain.
pub const EIP712_DOMAIN_NAME: &str = "zkSync";
/// Version of the typed-data domain.
pub const EIP712_DOMAIN_VERSION: &str = "2";

#[allow(missing_docs)]
mod schema {
    alloy_sol_types::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Transaction {
            uint256 txType;
            uint256 from;
            uint256 to;
            uint256 gasLimit;
            uint256 gasPerPubdataByteLimit;
            uint256 maxFeePerGas;
            uint256 maxPriorityFeePerGas;
            uint256 paymaster;
            uint256 nonce;
            uint256 value;
            bytes data;
            bytes32[] factoryDeps;
            bytes paymasterInput;
        }
    }
}

/// Constructs the typed-data domain for the provided chain.
pub fn domain(chain_id: u64) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(EIP712_DOMAIN_NAME)),
        Some(Cow::Borrowed(EIP712_DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        None,
        None,
    )
}

fn address_to_uint(address: Option<Address>) -> U256 {
    address.map_or(U256::ZERO, |address| U256::from_be_slice(address.as_slice()))
}

/// Maps a transaction request onto the typed-data structure, filling in
/// protocol defaults for omitted fields.
pub fn sign_input(request: &TransactionRequest) -> Result<Transaction, BytecodeHashError> {
    let meta = request.custom_data.clone().unwrap_or_default();
    let max_fee_per_gas = request.effective_max_fee_per_gas();

    let factory_deps = meta.factory_dep_hashes()?;
    let (paymaster, paymaster_input) = meta
        .paymaster_params
        .map(|params| (Some(params.paymaster), params.paymaster_input))
        .unwrap_or_default();

    Ok(Transaction {
        txType: U256::from(request.transaction_type.unwrap_or(EIP712_TX_TYPE)),
        from: address_to_uint(request.from),
        to: address_to_uint(request.to),
        gasLimit: U256::from(request.gas_limit.unwrap_or(0)),
        gasPerPubdataByteLimit: U256::from(meta.gas_per_pubdata),
        maxFeePerGas: U256::from(max_fee_per_gas),
        maxPriorityFeePerGas: U256::from(request.effective_max_priority_fee_per_gas()),
        paymaster: address_to_uint(paymaster),
        nonce: U256::from(request.nonce.unwrap_or(0)),
        value: request.value.unwrap_or(U256::ZERO),
        data: request.data.clone().unwrap_or_default(),
        factoryDeps: factory_deps,
        paymasterInput: paymaster_input,
    })
}

/// Computes the typed-data digest that a sender signs for the request.
///
/// The request's chain ID selects the domain; a missing or zero chain ID is
/// rejected.
pub fn signed_digest(request: &TransactionRequest) -> Result<B256, CodecError> {
    let chain_id = request
        .chain_id
        .filter(|chain_id| *chain_id != 0)
        .ok_or(CodecError::ChainIdRequired)?;

    let input = sign_input(request)?;
    Ok(input.eip712_signing_hash(&domain(chain_id)))
}
