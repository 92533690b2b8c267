use std::fmt;

/// Opaque wrapper around a [`reqwest_middleware::Error`].
///
/// Keeps the HTTP stack out of the public error types.
#[derive(Debug)]
pub struct MiddlewareError(reqwest_middleware::Error);

impl fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for MiddlewareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<reqwest_middleware::Error> for MiddlewareError {
    fn from(error: reqwest_middleware::Error) -> Self {
        Self(error)
    }
}

/// Opaque wrapper around a [`reqwest::Error`].
#[derive(Debug)]
pub struct ReqwestError(reqwest::Error);

impl ReqwestError {
    /// Returns the HTTP status code of the failed response, if any.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        self.0.status()
    }
}

impl fmt::Display for ReqwestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ReqwestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<reqwest::Error> for ReqwestError {
    fn from(error: reqwest::Error) -> Self {
        Self(error)
    }
}

impl From<ReqwestError> for reqwest::Error {
    fn from(error: ReqwestError) -> Self {
        error.0
    }
}
