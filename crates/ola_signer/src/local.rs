use std::fmt;

use alloy_primitives::{Address, Signature};
use alloy_sol_types::{Eip712Domain, SolStruct as _};
use k256::{SecretKey, ecdsa::SigningKey};
use ola_transaction::eip712::Transaction;

use crate::{SignerError, TypedDataSigner, public_key_to_address};

/// Signs typed data locally with a secp256k1 secret key.
pub struct SecretKeySigner {
    signing_key: SigningKey,
    address: Address,
}

impl SecretKeySigner {
    /// Constructs a signer for the account of the provided secret key.
    pub fn new(secret_key: SecretKey) -> Self {
        let address = public_key_to_address(secret_key.public_key());

        Self {
            signing_key: SigningKey::from(secret_key),
            address,
        }
    }
}

impl fmt::Debug for SecretKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The secret key is never printed.
        f.debug_struct("SecretKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl TypedDataSigner for SecretKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        input: &Transaction,
    ) -> Result<Signature, SignerError> {
        let digest = input.eip712_signing_hash(domain);
        let (signature, recovery_id) = self.signing_key.sign_prehash_recoverable(digest.as_slice())?;

        Ok(Signature::from_signature_and_parity(
            signature,
            recovery_id.is_y_odd(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use ola_test_utils::secret_key::{secret_key_from_str, secret_key_to_address};
    use ola_transaction::{TransactionRequest, eip712};

    use super::*;

    const SECRET_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn debug_omits_secret_key() -> anyhow::Result<()> {
        let signer = SecretKeySigner::new(secret_key_from_str(SECRET_KEY)?);

        let debug = format!("{signer:?}");
        assert!(debug.contains("address"));
        assert!(!debug.contains("59c6995e"));

        Ok(())
    }

    #[tokio::test]
    async fn signature_recovers_to_address() -> anyhow::Result<()> {
        let signer = SecretKeySigner::new(secret_key_from_str(SECRET_KEY)?);
        assert_eq!(signer.address(), secret_key_to_address(SECRET_KEY)?);

        let request = TransactionRequest {
            value: Some(U256::from(1)),
            chain_id: Some(270),
            ..TransactionRequest::default()
        };
        let input = eip712::sign_input(&request)?;
        let domain = eip712::domain(270);

        let signature = signer.sign_typed_data(&domain, &input).await?;
        let digest = input.eip712_signing_hash(&domain);
        assert_eq!(
            signature.recover_address_from_prehash(&digest)?,
            signer.address()
        );

        Ok(())
    }
}
