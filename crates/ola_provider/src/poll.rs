use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use alloy_primitives::{B256, U64};
use derive_where::derive_where;
use futures::{
    FutureExt as _,
    future::{BoxFuture, join_all},
};
use ola_rpc_client::Transport;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    ProviderConfig, ProviderError,
    emitted::{Emitted, EmittedKey},
    event::{LookupKind, PollError, ProviderEvent},
    filter::LogFilter,
    receipt::{ReceiptLookup, ReceiptResolver},
    rpc::{Log, TransactionReceipt},
    watch::{Watch, WatchId, WatchRegistry},
};

/// A head change larger than this is reported as skew instead of being
/// replayed block by block.
pub const BLOCK_SKEW_THRESHOLD: u64 = 1000;

static NEXT_POLL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug)]
struct CachedBlockNumber {
    block_number: u64,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct HeadState {
    /// Head of the last cycle that dispatched watches
    last_block_number: Option<u64>,
    /// Last block for which a block event was published
    emitted_block: Option<u64>,
    /// Most recently fetched head
    fast_block: Option<CachedBlockNumber>,
}

#[derive(Debug, Default)]
struct EngineState {
    head: HeadState,
    watches: WatchRegistry,
}

struct Shared<TransportT> {
    transport: TransportT,
    config: ProviderConfig,
    state: Mutex<EngineState>,
    events: broadcast::Sender<ProviderEvent>,
}

/// Interval-driven engine that tracks the chain head and evaluates watches.
///
/// Clones share their state. Cycles may overlap: a new cycle can start
/// before the lookups of the previous one have settled. Every mutation of the
/// shared state happens under a single lock that is never held across an
/// await point.
#[derive_where(Clone)]
pub struct PollEngine<TransportT> {
    shared: Arc<Shared<TransportT>>,
}

/// Handle to a poll cycle.
#[derive(Debug)]
pub struct PollTick {
    poll_id: u64,
    lookups: Option<JoinHandle<()>>,
}

impl PollTick {
    /// Process-wide identifier of the cycle.
    pub fn poll_id(&self) -> u64 {
        self.poll_id
    }

    /// Waits until every lookup of the cycle has settled and
    /// [`ProviderEvent::DidPoll`] was published.
    pub async fn settled(self) {
        if let Some(lookups) = self.lookups {
            if let Err(error) = lookups.await {
                log::error!("Poll cycle {} panicked: {error}", self.poll_id);
            }
        }
    }
}

enum Delivery {
    Receipt {
        receipt: Box<TransactionReceipt>,
        head: u64,
    },
    Logs(Result<Vec<Log>, ProviderError>),
}

impl<TransportT: Transport> PollEngine<TransportT> {
    /// Constructs a new instance.
    pub fn new(transport: TransportT, config: ProviderConfig) -> Self {
        let (events, _receiver) = broadcast::channel(config.event_capacity.max(1));

        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                state: Mutex::new(EngineState::default()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.shared.config
    }

    pub fn transport(&self) -> &TransportT {
        &self.shared.transport
    }

    /// Subscribes to the events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.shared.events.subscribe()
    }

    /// Registers a watch that is evaluated from the next cycle on.
    pub fn add_watch(&self, watch: Watch) -> WatchId {
        self.shared.state.lock().watches.add(watch)
    }

    /// Releases a watch registration. Lookups already in flight still
    /// complete, but their results are dropped once the watch is gone.
    pub fn remove_watch(&self, id: WatchId) -> bool {
        self.shared.state.lock().watches.remove(id)
    }

    pub fn has_watch(&self, id: WatchId) -> bool {
        self.shared.state.lock().watches.contains(id)
    }

    pub(crate) fn is_marked(&self, key: &EmittedKey) -> bool {
        self.shared.state.lock().watches.emitted().is_marked(key)
    }

    /// Sends a request and deserializes its result.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self, params)))]
    pub async fn request<SuccessT: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<serde_json::Value>,
    ) -> Result<SuccessT, ProviderError> {
        let value = self.shared.transport.send(method, params).await?;

        serde_json::from_value(value.clone()).map_err(|error| ProviderError::InvalidResponse {
            method,
            value,
            error,
        })
    }

    /// Fetches the chain head and records it as the fast block number.
    pub async fn fetch_block_number(&self) -> Result<u64, ProviderError> {
        let block_number = self
            .request::<U64>("eth_blockNumber", Vec::new())
            .await?
            .to::<u64>();

        self.record_fast_block(block_number);
        Ok(block_number)
    }

    /// Returns the fast block number if it is younger than `max_age`, or
    /// fetches the chain head otherwise.
    pub async fn internal_block_number(&self, max_age: Duration) -> Result<u64, ProviderError> {
        let cached = self.shared.state.lock().head.fast_block;
        if let Some(cached) = cached {
            if cached.fetched_at.elapsed() <= max_age {
                return Ok(cached.block_number);
            }
        }

        self.fetch_block_number().await
    }

    fn record_fast_block(&self, block_number: u64) {
        self.shared.state.lock().head.fast_block = Some(CachedBlockNumber {
            block_number,
            fetched_at: Instant::now(),
        });
    }

    fn emit(&self, event: ProviderEvent) {
        // Without subscribers the event is dropped.
        let _subscribers = self.shared.events.send(event);
    }

    /// Runs one poll cycle.
    ///
    /// Publishes [`ProviderEvent::Poll`] once the head is known and
    /// [`ProviderEvent::DidPoll`] once every lookup dispatched by the cycle
    /// has settled. Failures are published as [`ProviderEvent::Error`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn poll(&self) -> PollTick {
        let poll_id = NEXT_POLL_ID.fetch_add(1, Ordering::Relaxed);

        let head = match tokio::time::timeout(
            self.shared.config.head_fetch_timeout(),
            self.request::<U64>("eth_blockNumber", Vec::new()),
        )
        .await
        {
            Ok(Ok(head)) => head.to::<u64>(),
            Ok(Err(error)) => return self.abort_cycle(poll_id, &error),
            Err(_elapsed) => return self.abort_cycle(poll_id, &ProviderError::Timeout),
        };
        self.record_fast_block(head);

        self.emit(ProviderEvent::Poll {
            poll_id,
            block_number: head,
        });

        let (events, lookups) = {
            let mut state = self.shared.state.lock();

            if state.head.last_block_number == Some(head) {
                drop(state);

                log::trace!("Poll cycle {poll_id}: head {head} unchanged");
                self.emit(ProviderEvent::DidPoll { poll_id });
                return PollTick {
                    poll_id,
                    lookups: None,
                };
            }

            let events = advance_emitted_block(&mut state, head);
            let lookups = self.dispatch_watches(&mut state.watches, head);

            state.head.last_block_number = Some(head);

            (events, lookups)
        };

        log::debug!(
            "Poll cycle {poll_id}: head {head}, {} lookup(s) dispatched",
            lookups.len()
        );

        for event in events {
            self.emit(event);
        }

        let engine = self.clone();
        let lookups = tokio::spawn(async move {
            join_all(lookups).await;
            engine.emit(ProviderEvent::DidPoll { poll_id });
        });

        PollTick {
            poll_id,
            lookups: Some(lookups),
        }
    }

    fn abort_cycle(&self, poll_id: u64, error: &ProviderError) -> PollTick {
        log::error!("Poll cycle {poll_id} failed to fetch the block number: {error}");
        self.emit(ProviderEvent::Error(PollError::lookup(
            LookupKind::BlockNumber,
            error,
        )));

        PollTick {
            poll_id,
            lookups: None,
        }
    }

    fn dispatch_watches(
        &self,
        watches: &mut WatchRegistry,
        head: u64,
    ) -> Vec<BoxFuture<'static, ()>> {
        let max_range = self.shared.config.max_filter_block_range;

        watches
            .iter_mut()
            .filter_map(|(id, watch)| match watch {
                Watch::Transaction { hash } => Some(self.lookup_receipt(id, *hash, head)),
                Watch::Filter(filter_watch) => filter_watch
                    .begin_query(head, max_range)
                    .map(|(from_block, to_block)| {
                        self.lookup_logs(id, filter_watch.filter.with_range(from_block, to_block))
                    }),
            })
            .collect()
    }

    fn lookup_receipt(&self, id: WatchId, hash: B256, head: u64) -> BoxFuture<'static, ()> {
        let engine = self.clone();

        async move {
            match ReceiptResolver::new(engine.clone()).resolve(hash).await {
                Ok(ReceiptLookup::Found(receipt)) => {
                    engine.deliver(id, Delivery::Receipt { receipt, head });
                }
                Ok(ReceiptLookup::Absent | ReceiptLookup::Unresolved) => (),
                Err(error) => {
                    if engine.has_watch(id) {
                        log::error!("Failed to fetch the receipt of {hash}: {error}");
                        engine.emit(ProviderEvent::Error(PollError::lookup(
                            LookupKind::Receipt,
                            &error,
                        )));
                    }
                }
            }
        }
        .boxed()
    }

    fn lookup_logs(&self, id: WatchId, filter: LogFilter) -> BoxFuture<'static, ()> {
        let engine = self.clone();

        async move {
            let logs = engine.get_logs(&filter).await;
            engine.deliver(id, Delivery::Logs(logs));
        }
        .boxed()
    }

    /// Fetches the logs matching `filter`.
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
        let filter =
            serde_json::to_value(filter.prepared()).map_err(ProviderError::InvalidRequest)?;

        self.request("eth_getLogs", vec![filter]).await
    }

    /// Applies the result of a lookup, unless the watch was removed in the
    /// meantime.
    fn deliver(&self, id: WatchId, delivery: Delivery) {
        let mut events = Vec::new();
        {
            let mut state = self.shared.state.lock();

            let Some(watch) = state.watches.get_mut(id) else {
                log::trace!("Dropping late result for removed watch {id}");
                return;
            };

            let marks = match (watch, delivery) {
                (Watch::Transaction { hash }, Delivery::Receipt { receipt, head }) => {
                    // Rejected transactions have no block of their own.
                    let delivered_at = receipt.block_number.unwrap_or(head);
                    let hash = *hash;

                    events.push(ProviderEvent::Transaction { hash, receipt });
                    vec![(EmittedKey::Transaction(hash), delivered_at)]
                }
                (Watch::Filter(filter_watch), Delivery::Logs(Ok(logs))) => {
                    filter_watch.in_flight = false;

                    let mut marks = Vec::new();
                    for log in logs {
                        if let Some(block_number) = log.block_number {
                            if filter_watch
                                .last_block_number
                                .is_none_or(|last| block_number > last)
                            {
                                filter_watch.last_block_number = Some(block_number);
                            }

                            marks.extend(
                                log.block_hash
                                    .map(|block_hash| (EmittedKey::BlockHash(block_hash), block_number)),
                            );
                            marks.extend(log.transaction_hash.map(|transaction_hash| {
                                (EmittedKey::Transaction(transaction_hash), block_number)
                            }));
                        }

                        events.push(ProviderEvent::Log {
                            watch_id: id,
                            filter_key: filter_watch.key.clone(),
                            log: Box::new(log),
                        });
                    }
                    marks
                }
                (Watch::Filter(filter_watch), Delivery::Logs(Err(error))) => {
                    filter_watch.in_flight = false;

                    log::error!("Failed to fetch logs for watch {id}: {error}");
                    events.push(ProviderEvent::Error(PollError::lookup(
                        LookupKind::Logs,
                        &error,
                    )));
                    Vec::new()
                }
                (watch, _delivery) => {
                    log::error!("Lookup result does not match watch {id}: {watch:?}");
                    Vec::new()
                }
            };

            let emitted = state.watches.emitted_mut();
            for (key, block_number) in marks {
                emitted.mark(key, Emitted::Block(block_number));
            }
        }

        for event in events {
            self.emit(event);
        }
    }
}

/// Computes the block events for a new head and advances the emitted block.
fn advance_emitted_block(state: &mut EngineState, head: u64) -> Vec<ProviderEvent> {
    let mut events = Vec::new();

    match state.head.emitted_block {
        Some(previous_block_number) if previous_block_number.abs_diff(head) > BLOCK_SKEW_THRESHOLD => {
            log::warn!(
                "network block skew detected; skipping block events (emitted={previous_block_number} blockNumber={head})"
            );
            events.push(ProviderEvent::Error(PollError::BlockSkew {
                block_number: head,
                previous_block_number,
            }));
            events.push(ProviderEvent::Block(head));
        }
        // A small step backwards publishes nothing and keeps the emitted
        // block, so blocks are never published twice.
        Some(previous_block_number) if previous_block_number > head => return events,
        previous_block_number => {
            // The first cycle only publishes the current head.
            let first = previous_block_number.map_or(head, |previous| previous + 1);
            events.extend((first..=head).map(ProviderEvent::Block));
        }
    }

    if state.head.emitted_block != Some(head) {
        state.head.emitted_block = Some(head);
        state.watches.gc(head);
    }

    events
}
