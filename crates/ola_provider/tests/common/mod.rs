#![allow(dead_code)]

use std::time::Duration;

use alloy_primitives::B256;
use ola_provider::{OlaProvider, ProviderConfig, ProviderEvent};
use ola_test_utils::MockTransport;
use serde_json::{Value, json};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub const TX_HASH: B256 = B256::repeat_byte(0xaa);
pub const BLOCK_HASH: B256 = B256::repeat_byte(0xbb);

pub fn test_config() -> ProviderConfig {
    ProviderConfig {
        url: "http://localhost:3050".to_string(),
        polling_interval: Duration::from_millis(100),
        ..ProviderConfig::default()
    }
}

pub fn provider(transport: &MockTransport) -> OlaProvider<MockTransport> {
    OlaProvider::new(
        tokio::runtime::Handle::current(),
        transport.clone(),
        test_config(),
    )
}

/// Collects the events that were published so far.
pub fn drain(events: &mut broadcast::Receiver<ProviderEvent>) -> Vec<ProviderEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(TryRecvError::Lagged(_)) => (),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return drained,
        }
    }
}

pub fn poll_id(events: &[ProviderEvent]) -> Option<u64> {
    events.iter().find_map(|event| match event {
        ProviderEvent::Poll { poll_id, .. } => Some(*poll_id),
        _ => None,
    })
}

pub fn receipt_json(hash: B256, block_number: Option<u64>) -> Value {
    json!({
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": block_number.map(|_| BLOCK_HASH),
        "blockNumber": block_number.map(|number| format!("{number:#x}")),
        "l1BatchNumber": block_number.map(|_| "0x1"),
        "l1BatchTxIndex": block_number.map(|_| "0x0"),
        "from": "0x36615cf349d7f6344891b1e7ca7c72883f5dc049",
        "to": "0x000000000000000000000000000000000000800a",
        "gasUsed": "0x5208",
        "logs": [],
        "l2ToL1Logs": [],
        "status": "0x1",
        "type": "0x71",
    })
}

pub fn rejected_receipt_json(hash: B256) -> Value {
    let mut receipt = receipt_json(hash, None);
    receipt["status"] = json!("0x0");
    receipt["l1BatchNumber"] = json!("0x1");
    receipt
}

pub fn log_json(block_number: u64, transaction_hash: B256) -> Value {
    json!({
        "address": "0x000000000000000000000000000000000000800a",
        "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
        "data": "0x",
        "blockHash": BLOCK_HASH,
        "blockNumber": format!("{block_number:#x}"),
        "l1BatchNumber": null,
        "transactionHash": transaction_hash,
        "transactionIndex": "0x0",
        "logIndex": "0x0",
        "removed": false,
    })
}

pub fn block_json(number: u64) -> Value {
    json!({
        "hash": BLOCK_HASH,
        "parentHash": B256::ZERO,
        "number": format!("{number:#x}"),
        "timestamp": "0x1",
        "l1BatchNumber": "0x1",
        "l1BatchTimestamp": "0x1",
        "transactions": [],
    })
}
