#![warn(missing_docs)]

//! JSON-RPC client for rollup nodes

mod client;
mod reqwest_error;
mod transport;

/// Types specific to JSON-RPC
pub mod jsonrpc;

pub use reqwest::header::{self, HeaderMap};

pub use self::{
    client::{RpcClient, RpcClientError},
    reqwest_error::{MiddlewareError, ReqwestError},
    transport::Transport,
};
