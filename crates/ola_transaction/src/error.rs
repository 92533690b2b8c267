use crate::bytecode::BytecodeHashError;

/// An error that occurs when encoding, decoding or hashing a transaction.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Invalid bytecode in the factory dependencies.
    #[error(transparent)]
    Bytecode(#[from] BytecodeHashError),
    /// The transaction does not specify a chain ID, which is required for
    /// domain separation.
    #[error("Transaction chainId isn't set")]
    ChainIdRequired,
    /// A custom signature was provided, but it is empty.
    #[error("Empty signatures are not supported")]
    EmptyCustomSignature,
    /// An address field is neither empty nor 20 bytes long.
    #[error("Invalid address length: {0}")]
    InvalidAddressLength(usize),
    /// The paymaster parameters are neither empty nor a pair.
    #[error("Invalid paymaster parameters, expected to have length of 2, found {0}")]
    InvalidPaymasterParams(usize),
    /// The signature's V-value is invalid and no custom signature overrides it.
    #[error("Failed to parse signature with V-value {0}")]
    MalformedSignature(u64),
    /// Neither an ECDSA signature nor a custom signature is available.
    #[error("No signature provided")]
    MissingSignature,
    /// RLP error
    #[error(transparent)]
    Rlp(#[from] alloy_rlp::Error),
    /// Error decoding a standard transaction envelope.
    #[error(transparent)]
    Standard(#[from] alloy_eips::eip2718::Eip2718Error),
}
