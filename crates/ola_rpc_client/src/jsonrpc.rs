use serde::{Deserialize, Serialize};

/// Represents JSON-RPC 2.0 success response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Response<SuccessT> {
    /// JSON RPC version
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    /// Request ID
    pub id: Id,
    /// Response data
    #[serde(flatten)]
    pub data: ResponseData<SuccessT>,
}

/// Represents a JSON-RPC request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Request<MethodT> {
    /// JSON RPC version
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    /// Request ID
    pub id: Id,
    /// The method and its parameters
    #[serde(flatten)]
    pub method: MethodT,
}

/// A method call with positional parameters.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MethodCall {
    /// Name of the method
    pub method: String,
    /// Positional parameters
    pub params: Vec<serde_json::Value>,
}

/// Request ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric ID
    Num(u64),
    /// String ID
    Str(String),
}

/// JSON RPC version
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Version {
    /// Version 2.0
    #[serde(rename = "2.0")]
    V2_0,
}

/// Represents the response data of a JSON-RPC call.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResponseData<SuccessT> {
    /// Error response
    Error {
        /// The error
        error: Error,
    },
    /// Success response
    Success {
        /// The result
        result: SuccessT,
    },
}

impl<SuccessT> ResponseData<SuccessT> {
    /// Returns a [`Result`] where `Success` is mapped to `Ok` and `Error` to
    /// `Err`.
    pub fn into_result(self) -> Result<SuccessT, Error> {
        match self {
            ResponseData::Success { result } => Ok(result),
            ResponseData::Error { error } => Err(error),
        }
    }
}

/// A JSON-RPC error object.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, thiserror::Error)]
#[error("{message} (code: {code})")]
pub struct Error {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
