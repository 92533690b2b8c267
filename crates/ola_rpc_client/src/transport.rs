use std::{future::Future, sync::Arc};

use crate::{RpcClient, RpcClientError};

/// A JSON-RPC request/response capability.
pub trait Transport: Send + Sync + 'static {
    /// Sends a JSON-RPC request with positional parameters and returns the
    /// raw result.
    fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> impl Future<Output = Result<serde_json::Value, RpcClientError>> + Send;
}

impl Transport for RpcClient {
    fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> impl Future<Output = Result<serde_json::Value, RpcClientError>> + Send {
        self.call(method, params)
    }
}

impl<TransportT: Transport> Transport for Arc<TransportT> {
    fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> impl Future<Output = Result<serde_json::Value, RpcClientError>> + Send {
        self.as_ref().send(method, params)
    }
}
