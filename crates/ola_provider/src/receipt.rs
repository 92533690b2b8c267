use alloy_primitives::B256;
use ola_rpc_client::Transport;

use crate::{ProviderError, emitted::EmittedKey, poll::PollEngine, rpc::TransactionReceipt};

/// Outcome of a single receipt lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiptLookup {
    /// The transaction was included, or rejected before inclusion.
    Found(Box<TransactionReceipt>),
    /// The node does not know the transaction and it was never delivered;
    /// the receipt will not appear.
    Absent,
    /// The receipt is not available yet; look it up again later.
    Unresolved,
}

/// Looks up receipts and completes them with their confirmations.
pub struct ReceiptResolver<TransportT> {
    engine: PollEngine<TransportT>,
}

impl<TransportT: Transport> ReceiptResolver<TransportT> {
    pub fn new(engine: PollEngine<TransportT>) -> Self {
        Self { engine }
    }

    /// Performs one lookup of the receipt of `hash`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn resolve(&self, hash: B256) -> Result<ReceiptLookup, ProviderError> {
        let receipt: Option<TransactionReceipt> = self
            .engine
            .request("eth_getTransactionReceipt", vec![serde_json::json!(hash)])
            .await?;

        let Some(mut receipt) = receipt else {
            // A delivered receipt that disappears means the node is lagging.
            return Ok(if self.engine.is_marked(&EmittedKey::Transaction(hash)) {
                ReceiptLookup::Unresolved
            } else {
                ReceiptLookup::Absent
            });
        };

        if receipt.is_rejected() {
            receipt.block_number = None;
            receipt.block_hash = None;
            receipt.l1_batch_number = None;
            receipt.l1_batch_tx_index = None;
            receipt.confirmations = Some(1);

            return Ok(ReceiptLookup::Found(Box::new(receipt)));
        }

        if receipt.block_hash.is_none() {
            return Ok(ReceiptLookup::Unresolved);
        }

        match receipt.block_number {
            None => receipt.confirmations = Some(0),
            Some(block_number) if receipt.confirmations.is_none() => {
                let max_age = self.engine.config().head_max_age();
                let head = self.engine.internal_block_number(max_age).await?;

                receipt.confirmations = Some(confirmations(head, block_number));
            }
            Some(_) => (),
        }

        Ok(ReceiptLookup::Found(Box::new(receipt)))
    }
}

/// Counts the blocks from `block_number` up to `head`, both included. A
/// receipt that is ahead of the head counts as one confirmation.
pub fn confirmations(head: u64, block_number: u64) -> u64 {
    head.saturating_add(1).saturating_sub(block_number).max(1)
}
