use alloy_primitives::{Address, address};
#[allow(deprecated)]
// Test keys are public, so `DangerousSecretKeyStr` is fine here
use ola_signer::{DangerousSecretKeyStr, Eip712Signer, SecretKeySigner, public_key_to_address};
pub use ola_signer::{SecretKey, SignerError};

/// Secret key of the first pre-funded account of a local rollup node.
pub const RICH_WALLET_KEY: &str =
    "0x7726827caac94a7f9e1b160f7ea819f172f7b6f9d2a97f992c38edeab82d4110";

/// Address of [`RICH_WALLET_KEY`].
pub const RICH_WALLET_ADDRESS: Address = address!("0x36615cf349d7f6344891b1e7ca7c72883f5dc049");

/// Parses a hex secret key.
pub fn secret_key_from_str(secret_key: &str) -> Result<SecretKey, SignerError> {
    #[allow(deprecated)]
    ola_signer::secret_key_from_str(DangerousSecretKeyStr(secret_key))
}

/// Derives the address of a hex secret key.
///
/// Lives in the test utilities so that production code has a single place
/// that parses secret keys from strings.
///
/// ```
/// use ola_test_utils::secret_key::{RICH_WALLET_ADDRESS, RICH_WALLET_KEY, secret_key_to_address};
///
/// assert_eq!(secret_key_to_address(RICH_WALLET_KEY).unwrap(), RICH_WALLET_ADDRESS);
/// ```
pub fn secret_key_to_address(secret_key: &str) -> Result<Address, SignerError> {
    let secret_key = secret_key_from_str(secret_key)?;
    Ok(public_key_to_address(secret_key.public_key()))
}

/// Constructs a signer for the pre-funded local account on the given chain.
pub fn rich_wallet_signer(chain_id: u64) -> Result<Eip712Signer<SecretKeySigner>, SignerError> {
    let secret_key = secret_key_from_str(RICH_WALLET_KEY)?;
    Ok(Eip712Signer::new(SecretKeySigner::new(secret_key), chain_id))
}
