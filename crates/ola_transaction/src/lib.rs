#![warn(missing_docs)]

//! Transaction types for the OLA rollup.
//!
//! Besides the standard Ethereum envelopes, the rollup accepts an extended
//! EIP-712 transaction (type `0x71`) that carries paymaster parameters,
//! factory dependencies and an optional custom signature. This crate encodes
//! and decodes that envelope and reconstructs its canonical hash.

mod bytecode;
pub mod eip712;
mod envelope;
mod error;
mod meta;
pub mod request;
pub mod signed;

pub use alloy_primitives::{Address, B256, Bytes, U256, keccak256};

pub use self::{
    bytecode::{BYTECODE_HASH_VERSION, BytecodeHashError, MAX_BYTECODE_LEN_BYTES, hash_bytecode},
    envelope::{ParsedTransaction, parse_transaction},
    error::CodecError,
    meta::{DEFAULT_GAS_PER_PUBDATA_LIMIT, Eip712Meta, PaymasterParams},
    request::TransactionRequest,
};

/// The chain ID that is used when none is configured.
pub const DEFAULT_CHAIN_ID: u64 = 1027;

/// The type identifier of an EIP-712 transaction.
pub const EIP712_TX_TYPE: u8 = 0x71;
