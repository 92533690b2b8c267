//! Signed rollup transactions and their wire envelope.

use alloy_primitives::{Address, B256, Bytes, Signature, U256, keccak256};
use alloy_rlp::{Decodable as _, Encodable as _, Header};

use crate::{
    EIP712_TX_TYPE,
    eip712::signed_digest,
    error::CodecError,
    meta::{Eip712Meta, PaymasterParams},
    request::TransactionRequest,
};

/// Length of an ECDSA signature with recovery byte.
const ECDSA_SIGNATURE_LEN: usize = 65;

/// A rollup transaction that carries the typed-data extension.
///
/// The envelope is the type byte followed by an RLP list of 16 fields. The
/// signature is only present when the sender signed with ECDSA; transactions
/// authorised by a custom signature carry none.
#[derive(Clone, Debug, Eq)]
pub struct Eip712 {
    // The order of these fields determines encoding order.
    /// Nonce of the sender
    pub nonce: u64,
    /// Maximum priority fee per gas
    pub max_priority_fee_per_gas: u128,
    /// Maximum fee per gas
    pub max_fee_per_gas: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient, or `None` for contract deployment
    pub to: Option<Address>,
    /// Transferred value
    pub value: U256,
    /// Calldata
    pub input: Bytes,
    /// Chain ID
    pub chain_id: u64,
    /// Sender
    pub from: Option<Address>,
    /// Rollup-specific extension
    pub meta: Eip712Meta,
    /// ECDSA signature of the sender
    pub signature: Option<Signature>,
    /// Canonical transaction hash, when it could be reconstructed
    pub hash: Option<B256>,
}

impl Eip712 {
    /// The type identifier for a typed-data transaction.
    pub const TYPE: u8 = EIP712_TX_TYPE;

    /// Constructs an unsigned transaction from a request, filling in
    /// protocol defaults for omitted fields.
    pub fn from_request(request: TransactionRequest) -> Self {
        let max_fee_per_gas = request.effective_max_fee_per_gas();
        let max_priority_fee_per_gas = request.effective_max_priority_fee_per_gas();

        Self {
            nonce: request.nonce.unwrap_or(0),
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit: request.gas_limit.unwrap_or(0),
            to: request.to,
            value: request.value.unwrap_or(U256::ZERO),
            input: request.data.unwrap_or_default(),
            chain_id: request.chain_id.unwrap_or(0),
            from: request.from,
            meta: request.custom_data.unwrap_or_default(),
            signature: None,
            hash: None,
        }
    }

    /// Attaches an ECDSA signature and computes the canonical hash.
    pub fn with_signature(mut self, signature: Signature) -> Result<Self, CodecError> {
        self.signature = Some(signature);
        self.hash = Some(self.compute_hash()?);

        Ok(self)
    }

    /// Computes the typed-data digest that the sender signs.
    pub fn signed_digest(&self) -> Result<B256, CodecError> {
        signed_digest(&TransactionRequest::from(self))
    }

    /// Returns the signature material that enters the canonical hash.
    ///
    /// A non-empty custom signature takes precedence over the ECDSA
    /// signature, which is serialized as `r || s || v` with `v` in `{0, 1}`.
    pub fn signature_bytes(&self) -> Result<Bytes, CodecError> {
        if let Some(custom_signature) = self
            .meta
            .custom_signature
            .as_ref()
            .filter(|signature| !signature.is_empty())
        {
            return Ok(custom_signature.clone());
        }

        let signature = self.signature.as_ref().ok_or(CodecError::MissingSignature)?;

        let mut bytes = Vec::with_capacity(ECDSA_SIGNATURE_LEN);
        bytes.extend_from_slice(&signature.r().to_be_bytes::<32>());
        bytes.extend_from_slice(&signature.s().to_be_bytes::<32>());
        bytes.push(u8::from(signature.v()));

        Ok(bytes.into())
    }

    /// Computes the canonical transaction hash:
    /// `keccak256(signed_digest || keccak256(signature_bytes))`.
    pub fn compute_hash(&self) -> Result<B256, CodecError> {
        let signature_bytes = self.signature_bytes()?;
        let signed_digest = self.signed_digest()?;

        let hashed_signature = keccak256(&signature_bytes);
        Ok(keccak256(
            [signed_digest.as_slice(), hashed_signature.as_slice()].concat(),
        ))
    }

    /// Encodes the transaction into its wire envelope, including the type
    /// byte.
    ///
    /// Unsigned transactions are written with the chain ID in place of `v`
    /// and empty `r` and `s` values.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        self.meta.factory_dep_hashes()?;

        if self
            .meta
            .custom_signature
            .as_ref()
            .is_some_and(|signature| signature.is_empty())
        {
            return Err(CodecError::EmptyCustomSignature);
        }

        let mut payload = Vec::new();
        self.nonce.encode(&mut payload);
        self.max_priority_fee_per_gas.encode(&mut payload);
        self.max_fee_per_gas.encode(&mut payload);
        self.gas_limit.encode(&mut payload);
        encode_address(self.to.as_ref(), &mut payload);
        self.value.encode(&mut payload);
        self.input.encode(&mut payload);

        if let Some(signature) = &self.signature {
            u64::from(signature.v()).encode(&mut payload);
            signature.r().encode(&mut payload);
            signature.s().encode(&mut payload);
        } else {
            self.chain_id.encode(&mut payload);
            U256::ZERO.encode(&mut payload);
            U256::ZERO.encode(&mut payload);
        }

        self.chain_id.encode(&mut payload);
        encode_address(self.from.as_ref(), &mut payload);
        self.meta.gas_per_pubdata.encode(&mut payload);
        self.meta.factory_deps.encode(&mut payload);
        self.meta
            .custom_signature
            .clone()
            .unwrap_or_default()
            .encode(&mut payload);

        match &self.meta.paymaster_params {
            Some(params) => {
                Header {
                    list: true,
                    payload_length: params.paymaster.length() + params.paymaster_input.length(),
                }
                .encode(&mut payload);
                params.paymaster.encode(&mut payload);
                params.paymaster_input.encode(&mut payload);
            }
            None => Header {
                list: true,
                payload_length: 0,
            }
            .encode(&mut payload),
        }

        let header = Header {
            list: true,
            payload_length: payload.len(),
        };

        let mut encoded = Vec::with_capacity(1 + header.length() + payload.len());
        encoded.push(Self::TYPE);
        header.encode(&mut encoded);
        encoded.extend_from_slice(&payload);

        Ok(encoded.into())
    }

    /// Decodes a wire envelope, including the type byte.
    ///
    /// Numeric fields that are empty decode to zero and address fields that
    /// are empty decode to `None`. When neither a complete ECDSA signature
    /// nor a custom signature is present, the transaction is returned
    /// unsigned and without a hash.
    pub fn decode(encoded: &[u8]) -> Result<Self, CodecError> {
        let (ty, mut buf) = encoded
            .split_first()
            .ok_or(alloy_rlp::Error::InputTooShort)?;

        if *ty != Self::TYPE {
            return Err(alloy_rlp::Error::Custom("invalid transaction type").into());
        }

        let header = Header::decode(&mut buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }

        match buf.len().cmp(&header.payload_length) {
            std::cmp::Ordering::Less => return Err(alloy_rlp::Error::InputTooShort.into()),
            std::cmp::Ordering::Greater => return Err(alloy_rlp::Error::UnexpectedLength.into()),
            std::cmp::Ordering::Equal => {}
        }

        let fields = &mut buf;
        let nonce = decode_number(fields)?;
        let max_priority_fee_per_gas = decode_number(fields)?;
        let max_fee_per_gas = decode_number(fields)?;
        let gas_limit = decode_number(fields)?;
        let to = decode_address(fields)?;
        let value = decode_u256(fields)?;
        let input = Bytes::decode(fields)?;
        let v: u64 = decode_number(fields)?;
        let r = decode_u256(fields)?;
        let s = decode_u256(fields)?;
        let chain_id = decode_number(fields)?;
        let from = decode_address(fields)?;
        let gas_per_pubdata = decode_number(fields)?;
        let factory_deps = Vec::<Bytes>::decode(fields)?;
        let custom_signature = Some(Bytes::decode(fields)?).filter(|signature| !signature.is_empty());
        let paymaster_params = decode_paymaster_params(fields)?;

        if !fields.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength.into());
        }

        let mut transaction = Self {
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to,
            value,
            input,
            chain_id,
            from,
            meta: Eip712Meta {
                gas_per_pubdata,
                factory_deps,
                custom_signature,
                paymaster_params,
            },
            signature: None,
            hash: None,
        };

        let has_custom_signature = transaction.meta.custom_signature.is_some();
        if (r.is_zero() || s.is_zero()) && !has_custom_signature {
            return Ok(transaction);
        }

        if !has_custom_signature {
            let y_parity = match v {
                0 => false,
                1 => true,
                v => return Err(CodecError::MalformedSignature(v)),
            };

            transaction.signature = Some(Signature::new(r, s, y_parity));
        }

        transaction.hash = Some(transaction.compute_hash()?);

        Ok(transaction)
    }
}

impl PartialEq for Eip712 {
    fn eq(&self, other: &Self) -> bool {
        // Custom implementation of `PartialEq` to ignore the `hash` field.
        self.nonce == other.nonce
            && self.max_priority_fee_per_gas == other.max_priority_fee_per_gas
            && self.max_fee_per_gas == other.max_fee_per_gas
            && self.gas_limit == other.gas_limit
            && self.to == other.to
            && self.value == other.value
            && self.input == other.input
            && self.chain_id == other.chain_id
            && self.from == other.from
            && self.meta == other.meta
            && self.signature == other.signature
    }
}

impl From<&Eip712> for TransactionRequest {
    fn from(transaction: &Eip712) -> Self {
        Self {
            transaction_type: Some(Eip712::TYPE),
            from: transaction.from,
            to: transaction.to,
            gas_limit: Some(transaction.gas_limit),
            gas_price: None,
            max_fee_per_gas: Some(transaction.max_fee_per_gas),
            max_priority_fee_per_gas: Some(transaction.max_priority_fee_per_gas),
            nonce: Some(transaction.nonce),
            value: Some(transaction.value),
            data: Some(transaction.input.clone()),
            chain_id: Some(transaction.chain_id),
            custom_data: Some(transaction.meta.clone()),
        }
    }
}

fn encode_address(address: Option<&Address>, out: &mut Vec<u8>) {
    match address {
        Some(address) => address.encode(out),
        None => out.push(alloy_rlp::EMPTY_STRING_CODE),
    }
}

fn decode_u256(buf: &mut &[u8]) -> alloy_rlp::Result<U256> {
    let bytes = Header::decode_bytes(buf, false)?;
    U256::try_from_be_slice(bytes).ok_or(alloy_rlp::Error::Overflow)
}

fn decode_number<T: TryFrom<U256>>(buf: &mut &[u8]) -> alloy_rlp::Result<T> {
    T::try_from(decode_u256(buf)?).map_err(|_error| alloy_rlp::Error::Overflow)
}

fn address_from_slice(bytes: &[u8]) -> Result<Address, CodecError> {
    Address::try_from(bytes).map_err(|_error| CodecError::InvalidAddressLength(bytes.len()))
}

fn decode_address(buf: &mut &[u8]) -> Result<Option<Address>, CodecError> {
    let bytes = Header::decode_bytes(buf, false)?;
    if bytes.is_empty() {
        Ok(None)
    } else {
        address_from_slice(bytes).map(Some)
    }
}

fn decode_paymaster_params(buf: &mut &[u8]) -> Result<Option<PaymasterParams>, CodecError> {
    let items = Vec::<Bytes>::decode(buf)?;
    match items.as_slice() {
        [] => Ok(None),
        [paymaster, paymaster_input] => Ok(Some(PaymasterParams {
            paymaster: address_from_slice(paymaster)?,
            paymaster_input: paymaster_input.clone(),
        })),
        items => Err(CodecError::InvalidPaymasterParams(items.len())),
    }
}
