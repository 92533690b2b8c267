use std::future::Future;

use alloy_primitives::{Address, B256, Signature};
use alloy_sol_types::Eip712Domain;
use ola_transaction::{
    BytecodeHashError, CodecError, TransactionRequest,
    eip712::{self, Transaction},
    signed,
};

use crate::SignerError;

/// A capability that signs typed data on behalf of an account.
pub trait TypedDataSigner: Send + Sync {
    /// Returns the address of the signing account.
    fn address(&self) -> Address;

    /// Signs the typed-data transaction within the provided domain.
    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        input: &Transaction,
    ) -> impl Future<Output = Result<Signature, SignerError>> + Send;
}

/// Signs rollup transactions as typed data within the domain of a chain.
#[derive(Debug)]
pub struct Eip712Signer<SignerT> {
    signer: SignerT,
    domain: Eip712Domain,
    chain_id: u64,
}

impl<SignerT: TypedDataSigner> Eip712Signer<SignerT> {
    /// Constructs a signer for the provided chain.
    pub fn new(signer: SignerT, chain_id: u64) -> Self {
        Self {
            signer,
            domain: eip712::domain(chain_id),
            chain_id,
        }
    }

    /// Constructs a signer once the chain ID has been resolved.
    pub async fn connect<ErrorT>(
        signer: SignerT,
        chain_id: impl Future<Output = Result<u64, ErrorT>>,
    ) -> Result<Self, ErrorT> {
        let chain_id = chain_id.await?;
        Ok(Self::new(signer, chain_id))
    }

    /// Returns the address of the signing account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Returns the chain ID of the signing domain.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the signing domain.
    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Maps the request onto the typed-data structure.
    pub fn sign_input(request: &TransactionRequest) -> Result<Transaction, BytecodeHashError> {
        eip712::sign_input(request)
    }

    /// Computes the typed-data digest of the request, using the request's
    /// own chain ID.
    pub fn signed_digest(request: &TransactionRequest) -> Result<B256, CodecError> {
        eip712::signed_digest(request)
    }

    /// Signs the request's typed data.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn sign(&self, request: &TransactionRequest) -> Result<Signature, SignerError> {
        let input = Self::sign_input(request)?;
        self.signer.sign_typed_data(&self.domain, &input).await
    }

    /// Signs the request and returns the signed transaction, including its
    /// canonical hash.
    ///
    /// Missing sender and chain ID are filled in from the signer.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn sign_transaction(
        &self,
        mut request: TransactionRequest,
    ) -> Result<signed::Eip712, SignerError> {
        request.from.get_or_insert_with(|| self.signer.address());
        request.chain_id.get_or_insert(self.chain_id);
        request.transaction_type = Some(signed::Eip712::TYPE);

        let signature = self.sign(&request).await?;
        log::trace!("signed transaction from {:?}", request.from);

        let transaction = signed::Eip712::from_request(request).with_signature(signature)?;
        Ok(transaction)
    }

    /// Recovers the address that signed the request's typed data within this
    /// signer's domain.
    pub fn recover(
        &self,
        request: &TransactionRequest,
        signature: &Signature,
    ) -> Result<Address, SignerError> {
        use alloy_sol_types::SolStruct as _;

        let digest = Self::sign_input(request)?.eip712_signing_hash(&self.domain);
        let address = signature.recover_address_from_prehash(&digest)?;
        Ok(address)
    }

    /// Verifies that the signature was produced by this signer's account.
    pub fn verify(
        &self,
        request: &TransactionRequest,
        signature: &Signature,
    ) -> Result<(), SignerError> {
        let expected = self.signer.address();
        let actual = self.recover(request, signature)?;

        if actual == expected {
            Ok(())
        } else {
            Err(SignerError::VerificationError { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{U256, address};
    use ola_test_utils::secret_key::secret_key_from_str;
    use ola_transaction::{Bytes, Eip712Meta};

    use super::*;
    use crate::SecretKeySigner;

    const SECRET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn dummy_request() -> TransactionRequest {
        TransactionRequest {
            to: Some(address!("0xa61464658afeaf65cccaafd3a512b69a83b77618")),
            gas_limit: Some(500_000),
            max_fee_per_gas: Some(250_000_000),
            nonce: Some(0),
            value: Some(U256::from(10)),
            custom_data: Some(Eip712Meta {
                factory_deps: vec![Bytes::from(vec![0u8; 32])],
                ..Eip712Meta::default()
            }),
            ..TransactionRequest::default()
        }
    }

    fn dummy_signer() -> anyhow::Result<Eip712Signer<SecretKeySigner>> {
        let signer = SecretKeySigner::new(secret_key_from_str(SECRET_KEY)?);
        Ok(Eip712Signer::new(signer, 270))
    }

    #[tokio::test]
    async fn connect_resolves_chain_id() -> anyhow::Result<()> {
        let signer = SecretKeySigner::new(secret_key_from_str(SECRET_KEY)?);
        let signer =
            Eip712Signer::connect(signer, async { Ok::<_, anyhow::Error>(1027) }).await?;

        assert_eq!(signer.chain_id(), 1027);
        assert_eq!(signer.domain().chain_id, Some(U256::from(1027)));

        Ok(())
    }

    #[tokio::test]
    async fn sign_and_verify() -> anyhow::Result<()> {
        let signer = dummy_signer()?;
        let request = dummy_request();

        let signature = signer.sign(&request).await?;
        signer.verify(&request, &signature)?;
        assert_eq!(signer.recover(&request, &signature)?, signer.address());

        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_other_request() -> anyhow::Result<()> {
        let signer = dummy_signer()?;
        let request = dummy_request();

        let signature = signer.sign(&request).await?;
        let other = TransactionRequest {
            nonce: Some(1),
            ..request
        };

        assert!(matches!(
            signer.verify(&other, &signature),
            Err(SignerError::VerificationError { expected, .. }) if expected == signer.address()
        ));

        Ok(())
    }

    #[tokio::test]
    async fn sign_transaction_fills_sender_and_chain_id() -> anyhow::Result<()> {
        let signer = dummy_signer()?;

        let transaction = signer.sign_transaction(dummy_request()).await?;
        assert_eq!(transaction.from, Some(signer.address()));
        assert_eq!(transaction.chain_id, 270);
        assert!(transaction.signature.is_some());

        let decoded = signed::Eip712::decode(&transaction.encode()?)?;
        assert_eq!(decoded, transaction);
        assert_eq!(decoded.hash, transaction.hash);

        Ok(())
    }

    #[tokio::test]
    async fn sign_rejects_invalid_factory_deps() -> anyhow::Result<()> {
        let signer = dummy_signer()?;
        let request = TransactionRequest {
            custom_data: Some(Eip712Meta {
                factory_deps: vec![Bytes::from(vec![0u8; 33])],
                ..Eip712Meta::default()
            }),
            ..dummy_request()
        };

        assert!(matches!(
            signer.sign(&request).await,
            Err(SignerError::Bytecode(BytecodeHashError::InvalidLength(33)))
        ));

        Ok(())
    }

    #[test]
    fn signed_digest_uses_request_chain_id() -> anyhow::Result<()> {
        let request = TransactionRequest {
            chain_id: Some(270),
            ..dummy_request()
        };

        let expected = {
            use alloy_sol_types::SolStruct as _;
            eip712::sign_input(&request)?.eip712_signing_hash(&eip712::domain(270))
        };
        assert_eq!(
            Eip712Signer::<SecretKeySigner>::signed_digest(&request)?,
            expected
        );

        Ok(())
    }
}
