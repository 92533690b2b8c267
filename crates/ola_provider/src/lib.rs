//! Provider for the OLA rollup.
//!
//! Composes a JSON-RPC [`Transport`](ola_rpc_client::Transport) with the
//! rollup's RPC methods and a poll engine that delivers block, receipt and
//! log events to subscribers.

mod block_spec;
mod config;
mod emitted;
mod error;
mod event;
mod filter;
mod interval;
mod poll;
mod provider;
mod receipt;
mod request;
pub mod rpc;
mod watch;

pub use self::{
    block_spec::{BlockId, BlockSpec, BlockTag, InvalidBlockSpec},
    config::{
        DEFAULT_EVENT_CAPACITY, DEFAULT_MAX_FILTER_BLOCK_RANGE, DEFAULT_POLLING_INTERVAL,
        DEFAULT_URL, ProviderConfig, URL_ENV_VAR, default_url,
    },
    emitted::{EMITTED_HORIZON, Emitted, EmittedIndex, EmittedKey},
    error::ProviderError,
    event::{LookupKind, PollError, ProviderEvent},
    filter::{LogFilter, OneOrMore},
    interval::Poller,
    poll::{BLOCK_SKEW_THRESHOLD, PollEngine, PollTick},
    provider::{OlaProvider, SubmittedTransaction},
    receipt::{ReceiptLookup, ReceiptResolver, confirmations},
    request::{CallMeta, CallPaymasterParams, CallRequest},
    watch::{FilterWatch, Watch, WatchId, WatchRegistry},
};
