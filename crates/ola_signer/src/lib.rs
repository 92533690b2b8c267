//! Typed-data signing of rollup transactions.
//!
//! The [`Eip712Signer`] builds the domain-scoped typed data of a transaction
//! request and delegates signing to a [`TypedDataSigner`]. The
//! [`SecretKeySigner`] signs locally with a secp256k1 secret key.

mod local;
mod signer;

use alloy_primitives::Address;
pub use k256::SecretKey;
use k256::{FieldBytes, PublicKey, ecdsa::VerifyingKey};
use ola_transaction::{BytecodeHashError, CodecError};

pub use self::{
    local::SecretKeySigner,
    signer::{Eip712Signer, TypedDataSigner},
};

/// An error that occurs while signing a transaction or checking its
/// signature.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// A factory dependency is not valid bytecode.
    #[error(transparent)]
    Bytecode(#[from] BytecodeHashError),
    /// The transaction cannot be hashed or encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Signing with the secret key failed.
    #[error(transparent)]
    Ecdsa(#[from] k256::ecdsa::Error),
    /// The secret key is not a valid scalar.
    #[error(transparent)]
    EllipticCurve(#[from] k256::elliptic_curve::Error),
    /// The external signing capability failed.
    #[error(transparent)]
    External(Box<dyn std::error::Error + Send + Sync>),
    /// The secret key does not have 32 bytes.
    #[error("Secret key must be 32 bytes long")]
    InvalidSecretKeyLength,
    /// The secret key is not hex encoded. The offending character is not
    /// reported, as it would leak part of the key.
    #[error("Secret key is not valid hex")]
    InvalidSecretKeyHex,
    /// No address can be recovered from the signature.
    #[error(transparent)]
    Recovery(#[from] alloy_primitives::SignatureError),
    /// The signature was produced by another account.
    #[error("Transaction was signed by {actual}, expected {expected}")]
    VerificationError {
        /// The account that should have signed
        expected: Address,
        /// The account that signed
        actual: Address,
    },
}

/// Derives the account address of a public key.
pub fn public_key_to_address(public_key: PublicKey) -> Address {
    Address::from_public_key(&VerifyingKey::from(public_key))
}

/// Secret keys must not be passed around as plain strings, as their debug,
/// display and serialization implementations leak into logs. Marked as
/// deprecated so that every construction site is deliberate.
#[deprecated]
pub struct DangerousSecretKeyStr<'a>(pub &'a str);

/// Parses a hex secret key, with or without `0x` prefix.
#[allow(deprecated)]
pub fn secret_key_from_str(secret_key: DangerousSecretKeyStr<'_>) -> Result<SecretKey, SignerError> {
    #[allow(deprecated)]
    let DangerousSecretKeyStr(hex_key) = secret_key;

    let bytes = hex::decode(hex_key.strip_prefix("0x").unwrap_or(hex_key))
        .map_err(|_err| SignerError::InvalidSecretKeyHex)?;
    let field_bytes =
        FieldBytes::from_exact_iter(bytes).ok_or(SignerError::InvalidSecretKeyLength)?;

    SecretKey::from_bytes(&field_bytes).map_err(SignerError::EllipticCurve)
}
