//! HTTP transport port

use async_trait::async_trait;
use petmanager_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Errors raised when a request produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request or response body could not be processed.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Port for sending API requests.
///
/// Implementations resolve `request.path` against their configured base
/// URL. Any HTTP status, 401 included, is a successful send; only failures
/// to obtain a response are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
