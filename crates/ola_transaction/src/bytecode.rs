use alloy_primitives::B256;
use sha2::{Digest as _, Sha256};

/// Version marker written to the first two bytes of a bytecode hash.
pub const BYTECODE_HASH_VERSION: [u8; 2] = [1, 0];

/// The maximum length of a bytecode in bytes.
///
/// The length in 32-byte words has to fit in the two bytes that follow the
/// version marker.
pub const MAX_BYTECODE_LEN_BYTES: usize = ((1 << 16) - 1) * 32;

const WORD_SIZE: usize = 32;

/// An error that occurs when hashing a bytecode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BytecodeHashError {
    /// The bytecode length is not a multiple of 32 bytes.
    #[error("The bytecode length in bytes must be divisible by 32, found {0}")]
    InvalidLength(usize),
    /// The bytecode exceeds [`MAX_BYTECODE_LEN_BYTES`].
    #[error("Bytecode can not be longer than {MAX_BYTECODE_LEN_BYTES} bytes, found {0}")]
    TooLarge(usize),
    /// The bytecode length in words is even.
    #[error("Bytecode length in 32-byte words must be odd, found {0} words")]
    EvenWordCount(usize),
}

/// Computes the versioned hash of a bytecode.
///
/// The result is the SHA-256 digest of the bytecode, with the first two bytes
/// replaced by [`BYTECODE_HASH_VERSION`] and the next two bytes replaced by the
/// big-endian length of the bytecode in 32-byte words.
pub fn hash_bytecode(bytecode: &[u8]) -> Result<B256, BytecodeHashError> {
    let length = bytecode.len();
    if length % WORD_SIZE != 0 {
        return Err(BytecodeHashError::InvalidLength(length));
    }

    if length > MAX_BYTECODE_LEN_BYTES {
        return Err(BytecodeHashError::TooLarge(length));
    }

    let word_count = length / WORD_SIZE;
    if word_count % 2 == 0 {
        return Err(BytecodeHashError::EvenWordCount(word_count));
    }

    let word_count =
        u16::try_from(word_count).map_err(|_error| BytecodeHashError::TooLarge(length))?;

    let mut hash: [u8; 32] = Sha256::digest(bytecode).into();
    hash[..2].copy_from_slice(&BYTECODE_HASH_VERSION);
    hash[2..4].copy_from_slice(&word_count.to_be_bytes());

    Ok(B256::from(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_versioned_and_length_prefixed() -> anyhow::Result<()> {
        for word_count in [1usize, 3, 5, 255, 257] {
            let bytecode = vec![0xab; word_count * WORD_SIZE];
            let hash = hash_bytecode(&bytecode)?;

            assert_eq!(hash[..2], BYTECODE_HASH_VERSION);
            assert_eq!(hash[2..4], (word_count as u16).to_be_bytes());
            assert_eq!(hash, hash_bytecode(&bytecode)?);

            let digest = Sha256::digest(&bytecode);
            assert_eq!(hash[4..], digest[4..]);
        }

        Ok(())
    }

    #[test]
    fn largest_bytecode_is_accepted() -> anyhow::Result<()> {
        let bytecode = vec![1u8; MAX_BYTECODE_LEN_BYTES];
        let hash = hash_bytecode(&bytecode)?;

        assert_eq!(hash[2..4], [0xff, 0xff]);

        Ok(())
    }

    #[test]
    fn length_not_divisible_by_word_size() {
        assert_eq!(
            hash_bytecode(&[0u8; 33]),
            Err(BytecodeHashError::InvalidLength(33))
        );
    }

    #[test]
    fn empty_bytecode() {
        assert_eq!(hash_bytecode(&[]), Err(BytecodeHashError::EvenWordCount(0)));
    }

    #[test]
    fn even_word_count() {
        assert_eq!(
            hash_bytecode(&[0u8; 64]),
            Err(BytecodeHashError::EvenWordCount(2))
        );
    }

    #[test]
    fn too_large() {
        let length = MAX_BYTECODE_LEN_BYTES + 2 * WORD_SIZE;
        assert_eq!(
            hash_bytecode(&vec![0u8; length]),
            Err(BytecodeHashError::TooLarge(length))
        );
    }
}
