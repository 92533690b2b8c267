use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    sync::Arc,
    time::Duration,
};

use ola_rpc_client::{RpcClientError, Transport, jsonrpc};
use parking_lot::Mutex;
use serde_json::Value;

type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, jsonrpc::Error> + Send + Sync>;

#[derive(Clone)]
enum Reply {
    Value(Value),
    Error(jsonrpc::Error),
    Handler(Handler),
}

impl Reply {
    fn evaluate(&self, params: &[Value]) -> Result<Value, jsonrpc::Error> {
        match self {
            Reply::Value(value) => Ok(value.clone()),
            Reply::Error(error) => Err(error.clone()),
            Reply::Handler(handler) => handler(params),
        }
    }
}

#[derive(Default)]
struct State {
    sticky: HashMap<String, Reply>,
    queued: HashMap<String, VecDeque<Reply>>,
    delays: HashMap<String, Duration>,
    requests: Vec<(String, Vec<Value>)>,
}

impl State {
    fn next_reply(&mut self, method: &str) -> Option<Reply> {
        self.queued
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.sticky.get(method).cloned())
    }
}

/// A transport that answers requests from scripted replies.
///
/// Queued replies are consumed in order before falling back to the sticky
/// reply of a method. Methods without any reply fail with the JSON-RPC
/// "method not found" error. Clones share their script and request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Constructs a transport without any scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request of the method with the provided value.
    pub fn respond(&self, method: &str, value: Value) -> &Self {
        self.state
            .lock()
            .sticky
            .insert(method.to_string(), Reply::Value(value));
        self
    }

    /// Answers the next request of the method with the provided value.
    pub fn respond_once(&self, method: &str, value: Value) -> &Self {
        self.enqueue(method, Reply::Value(value))
    }

    /// Answers every request of the method by calling the handler with the
    /// request's parameters.
    pub fn respond_with(
        &self,
        method: &str,
        handler: impl Fn(&[Value]) -> Result<Value, jsonrpc::Error> + Send + Sync + 'static,
    ) -> &Self {
        self.state
            .lock()
            .sticky
            .insert(method.to_string(), Reply::Handler(Arc::new(handler)));
        self
    }

    /// Fails every request of the method with a server error.
    pub fn fail(&self, method: &str, message: &str) -> &Self {
        self.state
            .lock()
            .sticky
            .insert(method.to_string(), Reply::Error(server_error(message)));
        self
    }

    /// Fails the next request of the method with a server error.
    pub fn fail_once(&self, method: &str, message: &str) -> &Self {
        self.enqueue(method, Reply::Error(server_error(message)))
    }

    /// Delays every response of the method by the provided duration.
    pub fn delay(&self, method: &str, delay: Duration) -> &Self {
        self.state.lock().delays.insert(method.to_string(), delay);
        self
    }

    /// Answers `eth_blockNumber` with the provided block number.
    pub fn set_block_number(&self, block_number: u64) -> &Self {
        self.respond("eth_blockNumber", Value::String(format!("{block_number:#x}")))
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().requests.clone()
    }

    /// Returns the parameters of every request of the method, in order.
    pub fn requests_of(&self, method: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    /// Returns the number of requests of the method received so far.
    pub fn request_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|(name, _)| name == method)
            .count()
    }

    fn enqueue(&self, method: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, RpcClientError>> + Send {
        let (result, delay) = {
            let mut state = self.state.lock();
            state.requests.push((method.to_string(), params.clone()));

            let result = match state.next_reply(method) {
                Some(reply) => reply.evaluate(&params),
                None => Err(jsonrpc::Error {
                    code: -32601,
                    message: format!("Method not found: {method}"),
                    data: None,
                }),
            };
            (result, state.delays.get(method).copied())
        };

        let request = serde_json::json!({ "method": method, "params": params }).to_string();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            result.map_err(|error| RpcClientError::JsonRpcError { error, request })
        }
    }
}

fn server_error(message: &str) -> jsonrpc::Error {
    jsonrpc::Error {
        code: -32000,
        message: message.to_string(),
        data: None,
    }
}
