use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::Decodable2718 as _;
use alloy_primitives::B256;

use crate::{error::CodecError, signed};

/// A transaction decoded from its wire envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedTransaction {
    /// Rollup transaction with the typed-data extension
    Eip712(signed::Eip712),
    /// Standard Ethereum transaction
    Standard(TxEnvelope),
}

impl ParsedTransaction {
    /// Returns the transaction hash, if it could be reconstructed.
    pub fn hash(&self) -> Option<B256> {
        match self {
            ParsedTransaction::Eip712(transaction) => transaction.hash,
            ParsedTransaction::Standard(envelope) => Some(*envelope.tx_hash()),
        }
    }
}

/// Decodes a transaction envelope, dispatching on the type byte.
///
/// Anything other than the rollup transaction type is handed to the
/// standard EIP-2718 decoder unchanged.
pub fn parse_transaction(encoded: &[u8]) -> Result<ParsedTransaction, CodecError> {
    match encoded.first() {
        None => Err(alloy_rlp::Error::InputTooShort.into()),
        Some(&signed::Eip712::TYPE) => signed::Eip712::decode(encoded).map(ParsedTransaction::Eip712),
        Some(_) => {
            let mut buf = encoded;
            let envelope = TxEnvelope::decode_2718(&mut buf)?;
            Ok(ParsedTransaction::Standard(envelope))
        }
    }
}
