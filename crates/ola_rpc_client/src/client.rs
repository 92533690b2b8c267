use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use reqwest::{
    Client as HttpClient,
    header::{self, HeaderMap, HeaderValue},
};
use reqwest_middleware::{ClientBuilder as HttpClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
#[cfg(feature = "tracing")]
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::{MiddlewareError, ReqwestError, jsonrpc};

// Backoff for transient HTTP failures
const BACKOFF_BASE: u32 = 2;
const BACKOFF_MIN: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(32);
const BACKOFF_RETRIES: u32 = 9;

const USER_AGENT: &str = concat!("ola-web3 ", env!("CARGO_PKG_VERSION"));

/// An error that occurs while exchanging a JSON-RPC message with a node.
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    /// Sending the request failed, after retries.
    #[error(transparent)]
    FailedToSend(MiddlewareError),

    /// The HTTP client cannot be built from the provided headers.
    #[error("Cannot construct HTTP client: {0}")]
    HttpClient(ReqwestError),

    /// Reading the response body failed.
    #[error("Cannot read response body: {0}")]
    CorruptedResponse(ReqwestError),

    /// The node answered with a non-success HTTP status.
    #[error("Node answered with HTTP error: {0}")]
    HttpStatus(ReqwestError),

    /// The request parameters cannot be serialized.
    #[error(transparent)]
    InvalidJsonRequest(serde_json::Error),

    /// The body is not a JSON-RPC response carrying the expected result type.
    #[error("Cannot decode `{response}` as a response with a {expected_type} result: {error}")]
    InvalidResponse {
        /// Raw response body
        response: String,
        /// Name of the expected result type
        expected_type: &'static str,
        /// Decoding failure
        error: serde_json::Error,
    },

    /// The response answers a different request.
    #[error("Response id {id:?} does not match the request: `{response}`")]
    InvalidId {
        /// Raw response body
        response: String,
        /// Id carried by the response
        id: jsonrpc::Id,
    },

    /// The node URL cannot be parsed.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// The node answered with a JSON-RPC error object.
    #[error("{error}. Request: {request}")]
    JsonRpcError {
        /// Error object returned by the node
        error: jsonrpc::Error,
        /// Serialized request
        request: String,
    },
}

/// HTTP JSON-RPC client for a rollup node.
///
/// Transient HTTP failures are retried with exponential backoff. A JSON-RPC
/// "missing trie node" error is retried once, as some nodes report it while
/// still syncing state.
#[derive(Debug)]
pub struct RpcClient {
    url: url::Url,
    client: ClientWithMiddleware,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Constructs a client for the node at `url`. The `extra_headers` are
    /// sent with every request.
    pub fn new(url: &str, extra_headers: Option<HeaderMap>) -> Result<Self, RpcClientError> {
        let url = url.parse()?;

        let mut headers = extra_headers.unwrap_or_default();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|error| RpcClientError::HttpClient(error.into()))?;

        Ok(RpcClient {
            url,
            client: with_middleware(http_client),
            next_id: AtomicU64::new(0),
        })
    }

    /// Returns the URL of the remote node.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Calls the provided JSON-RPC method and returns the result.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self, params)))]
    pub async fn call<SuccessT: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<SuccessT, RpcClientError> {
        let envelope = self.envelope(method, params)?;

        let error = match self.exchange(&envelope).await? {
            Ok(result) => return Ok(result),
            Err(error) if is_missing_trie_node(&error) => {
                log::debug!("Retrying `{method}` after sporadic failure: {error}");
                match self.exchange(&envelope).await? {
                    Ok(result) => return Ok(result),
                    Err(error) => error,
                }
            }
            Err(error) => error,
        };

        Err(RpcClientError::JsonRpcError {
            error,
            request: envelope.body,
        })
    }

    fn envelope(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<Envelope, RpcClientError> {
        let id = jsonrpc::Id::Num(self.next_id.fetch_add(1, Ordering::Relaxed));

        let body = serde_json::to_string(&jsonrpc::Request {
            version: jsonrpc::Version::V2_0,
            id: id.clone(),
            method: jsonrpc::MethodCall {
                method: method.to_string(),
                params,
            },
        })
        .map_err(RpcClientError::InvalidJsonRequest)?;

        Ok(Envelope { id, body })
    }

    /// Posts the envelope and decodes the JSON-RPC response that answers it.
    async fn exchange<SuccessT: DeserializeOwned>(
        &self,
        envelope: &Envelope,
    ) -> Result<Result<SuccessT, jsonrpc::Error>, RpcClientError> {
        let text = self.post(envelope.body.clone()).await?;
        let response = decode_response::<SuccessT>(text, &envelope.id)?;

        Ok(response.data.into_result())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    async fn post(&self, body: String) -> Result<String, RpcClientError> {
        let response = self
            .client
            .post(self.url.clone())
            .body(body)
            .send()
            .await
            .map_err(|error| RpcClientError::FailedToSend(error.into()))?;

        response
            .error_for_status()
            .map_err(|error| RpcClientError::HttpStatus(error.into()))?
            .text()
            .await
            .map_err(|error| RpcClientError::CorruptedResponse(error.into()))
    }
}

#[cfg(feature = "tracing")]
fn with_middleware(http_client: HttpClient) -> ClientWithMiddleware {
    HttpClientBuilder::new(http_client)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy()))
        .build()
}

#[cfg(not(feature = "tracing"))]
fn with_middleware(http_client: HttpClient) -> ClientWithMiddleware {
    HttpClientBuilder::new(http_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy()))
        .build()
}

fn retry_policy() -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .retry_bounds(BACKOFF_MIN, BACKOFF_MAX)
        .base(BACKOFF_BASE)
        .build_with_max_retries(BACKOFF_RETRIES)
}

fn is_missing_trie_node(error: &jsonrpc::Error) -> bool {
    error.code == -32000 && error.message.to_lowercase().contains("missing trie node")
}

fn decode_response<SuccessT: DeserializeOwned>(
    text: String,
    expected_id: &jsonrpc::Id,
) -> Result<jsonrpc::Response<SuccessT>, RpcClientError> {
    let response = serde_json::from_str::<jsonrpc::Response<SuccessT>>(&text).map_err(|error| {
        RpcClientError::InvalidResponse {
            response: text.clone(),
            expected_type: std::any::type_name::<SuccessT>(),
            error,
        }
    })?;

    if response.id == *expected_id {
        Ok(response)
    } else {
        Err(RpcClientError::InvalidId {
            response: text,
            id: response.id,
        })
    }
}

/// A serialized request and the id its response must carry.
#[derive(Clone, Debug)]
struct Envelope {
    id: jsonrpc::Id,
    body: String,
}
