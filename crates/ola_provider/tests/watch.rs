mod common;

use std::time::Duration;

use alloy_primitives::{Address, B256, address};
use ola_provider::{
    LogFilter, LookupKind, OneOrMore, PollError, ProviderEvent, ReceiptLookup, ReceiptResolver,
    rpc::TransactionReceipt,
};
use ola_test_utils::MockTransport;
use serde_json::{Value, json};

use crate::common::{
    TX_HASH, drain, log_json, provider, receipt_json, rejected_receipt_json,
};

const TOKEN: Address = address!("0x000000000000000000000000000000000000800a");

fn token_filter() -> LogFilter {
    LogFilter {
        address: Some(OneOrMore::One(TOKEN)),
        ..LogFilter::default()
    }
}

fn range(from_block: &str, to_block: &str) -> Vec<Value> {
    vec![json!({
        "fromBlock": from_block,
        "toBlock": to_block,
        "address": TOKEN,
    })]
}

fn delivered_receipts(events: &[ProviderEvent]) -> Vec<TransactionReceipt> {
    events
        .iter()
        .filter_map(|event| match event {
            ProviderEvent::Transaction { receipt, .. } => Some((**receipt).clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn empty_log_result_keeps_bookmark() {
    let transport = MockTransport::new();
    transport.respond("eth_getLogs", json!([]));

    let provider = provider(&transport);
    provider.watch_logs(token_filter());

    transport.set_block_number(100);
    provider.poll().await.settled().await;

    transport.set_block_number(101);
    provider.poll().await.settled().await;

    assert_eq!(
        transport.requests_of("eth_getLogs"),
        vec![range("0x64", "0x64"), range("0x64", "0x65")]
    );
}

#[tokio::test]
async fn logs_advance_bookmark() -> anyhow::Result<()> {
    let other_hash = B256::repeat_byte(0xcc);

    let transport = MockTransport::new();
    transport
        .respond_once("eth_getLogs", json!([log_json(100, TX_HASH)]))
        .respond("eth_getLogs", json!([]))
        .respond("eth_getTransactionReceipt", Value::Null);

    let provider = provider(&transport);
    let watch_id = provider.watch_logs(token_filter());
    let mut events = provider.subscribe();

    transport.set_block_number(100);
    provider.poll().await.settled().await;

    let logs: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            ProviderEvent::Log {
                watch_id,
                filter_key,
                log,
            } => Some((watch_id, filter_key, log.block_number)),
            _ => None,
        })
        .collect();
    assert_eq!(
        logs,
        vec![(watch_id, token_filter().event_key(), Some(100))]
    );

    transport.set_block_number(102);
    provider.poll().await.settled().await;

    assert_eq!(
        transport.requests_of("eth_getLogs"),
        vec![range("0x64", "0x64"), range("0x65", "0x66")]
    );

    // The transaction of a delivered log is known to exist.
    let resolver = ReceiptResolver::new(provider.engine().clone());
    assert_eq!(resolver.resolve(TX_HASH).await?, ReceiptLookup::Unresolved);
    assert_eq!(resolver.resolve(other_hash).await?, ReceiptLookup::Absent);

    Ok(())
}

#[tokio::test]
async fn log_range_is_bounded() {
    let transport = MockTransport::new();
    transport.respond("eth_getLogs", json!([]));

    let provider = provider(&transport);
    provider.watch_logs(token_filter());

    transport.set_block_number(100);
    provider.poll().await.settled().await;

    transport.set_block_number(150);
    provider.poll().await.settled().await;

    assert_eq!(
        transport.requests_of("eth_getLogs"),
        vec![range("0x64", "0x64"), range("0x8c", "0x96")]
    );
}

#[tokio::test(start_paused = true)]
async fn one_log_query_in_flight_per_filter() {
    let transport = MockTransport::new();
    transport
        .respond("eth_getLogs", json!([]))
        .delay("eth_getLogs", Duration::from_secs(1));

    let provider = provider(&transport);
    provider.watch_logs(token_filter());

    transport.set_block_number(100);
    let first = provider.poll().await;

    transport.set_block_number(101);
    let second = provider.poll().await;

    first.settled().await;
    second.settled().await;
    assert_eq!(transport.request_count("eth_getLogs"), 1);

    transport.set_block_number(102);
    provider.poll().await.settled().await;

    assert_eq!(
        transport.requests_of("eth_getLogs"),
        vec![range("0x64", "0x64"), range("0x64", "0x66")]
    );
}

#[tokio::test]
async fn failed_log_query_is_retried() {
    let transport = MockTransport::new();
    transport
        .fail_once("eth_getLogs", "query timeout")
        .respond("eth_getLogs", json!([]));

    let provider = provider(&transport);
    provider.watch_logs(token_filter());
    let mut events = provider.subscribe();

    transport.set_block_number(100);
    provider.poll().await.settled().await;

    assert!(drain(&mut events).iter().any(|event| matches!(
        event,
        ProviderEvent::Error(PollError::Lookup {
            kind: LookupKind::Logs,
            ..
        })
    )));

    transport.set_block_number(101);
    provider.poll().await.settled().await;

    assert_eq!(
        transport.requests_of("eth_getLogs"),
        vec![range("0x64", "0x64"), range("0x64", "0x65")]
    );
}

#[tokio::test]
async fn receipt_in_head_block_has_one_confirmation() {
    let transport = MockTransport::new();
    transport
        .set_block_number(100)
        .respond("eth_getTransactionReceipt", receipt_json(TX_HASH, Some(100)));

    let provider = provider(&transport);
    provider.watch_transaction(TX_HASH);
    let mut events = provider.subscribe();

    provider.poll().await.settled().await;

    let receipts = delivered_receipts(&drain(&mut events));
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].transaction_hash, TX_HASH);
    assert_eq!(receipts[0].confirmations, Some(1));
}

#[tokio::test]
async fn rejected_receipt_is_delivered() {
    let transport = MockTransport::new();
    transport
        .set_block_number(100)
        .respond("eth_getTransactionReceipt", rejected_receipt_json(TX_HASH));

    let provider = provider(&transport);
    provider.watch_transaction(TX_HASH);
    let mut events = provider.subscribe();

    provider.poll().await.settled().await;

    let receipts = delivered_receipts(&drain(&mut events));
    assert_eq!(receipts.len(), 1);

    let receipt = &receipts[0];
    assert_eq!(receipt.status, Some(0));
    assert_eq!(receipt.block_number, None);
    assert_eq!(receipt.block_hash, None);
    assert_eq!(receipt.l1_batch_number, None);
    assert_eq!(receipt.l1_batch_tx_index, None);
    assert_eq!(receipt.confirmations, Some(1));
}

#[tokio::test]
async fn pending_receipt_is_not_delivered() {
    let transport = MockTransport::new();
    transport
        .set_block_number(100)
        .respond("eth_getTransactionReceipt", receipt_json(TX_HASH, None));

    let provider = provider(&transport);
    provider.watch_transaction(TX_HASH);
    let mut events = provider.subscribe();

    let tick = provider.poll().await;
    let poll_id = tick.poll_id();
    tick.settled().await;

    let events = drain(&mut events);
    assert!(delivered_receipts(&events).is_empty());
    assert_eq!(events.last(), Some(&ProviderEvent::DidPoll { poll_id }));
}

#[tokio::test(start_paused = true)]
async fn late_result_for_removed_watch_is_dropped() {
    let transport = MockTransport::new();
    transport
        .set_block_number(100)
        .respond("eth_getTransactionReceipt", receipt_json(TX_HASH, Some(100)))
        .delay("eth_getTransactionReceipt", Duration::from_millis(50));

    let provider = provider(&transport);
    let watch_id = provider.watch_transaction(TX_HASH);
    let mut events = provider.subscribe();

    let tick = provider.poll().await;
    let poll_id = tick.poll_id();
    assert!(provider.unwatch(watch_id));
    tick.settled().await;

    let events = drain(&mut events);
    assert_eq!(transport.request_count("eth_getTransactionReceipt"), 1);
    assert!(delivered_receipts(&events).is_empty());
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, ProviderEvent::Error(_)))
    );
    assert_eq!(events.last(), Some(&ProviderEvent::DidPoll { poll_id }));
}

#[tokio::test]
async fn failed_receipt_lookup_keeps_watch() {
    let transport = MockTransport::new();
    transport
        .fail_once("eth_getTransactionReceipt", "backend unavailable")
        .respond("eth_getTransactionReceipt", Value::Null);

    let provider = provider(&transport);
    let watch_id = provider.watch_transaction(TX_HASH);
    let mut events = provider.subscribe();

    transport.set_block_number(100);
    let tick = provider.poll().await;
    let poll_id = tick.poll_id();
    tick.settled().await;

    let events = drain(&mut events);
    assert!(events.iter().any(|event| matches!(
        event,
        ProviderEvent::Error(PollError::Lookup {
            kind: LookupKind::Receipt,
            ..
        })
    )));
    assert_eq!(events.last(), Some(&ProviderEvent::DidPoll { poll_id }));
    assert!(provider.engine().has_watch(watch_id));

    transport.set_block_number(101);
    provider.poll().await.settled().await;
    assert_eq!(transport.request_count("eth_getTransactionReceipt"), 2);
}

#[tokio::test]
async fn delivery_records_expire_after_twelve_blocks() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport
        .set_block_number(10)
        .respond("eth_getTransactionReceipt", receipt_json(TX_HASH, Some(10)));

    let provider = provider(&transport);
    let watch_id = provider.watch_transaction(TX_HASH);

    provider.poll().await.settled().await;
    provider.unwatch(watch_id);

    transport.respond("eth_getTransactionReceipt", Value::Null);
    let resolver = ReceiptResolver::new(provider.engine().clone());

    transport.set_block_number(22);
    provider.poll().await.settled().await;
    assert_eq!(resolver.resolve(TX_HASH).await?, ReceiptLookup::Unresolved);

    transport.set_block_number(23);
    provider.poll().await.settled().await;
    assert_eq!(resolver.resolve(TX_HASH).await?, ReceiptLookup::Absent);

    Ok(())
}
