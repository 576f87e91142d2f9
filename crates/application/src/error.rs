//! Application error types

use petmanager_domain::{AuthError, DomainError};
use thiserror::Error;

use crate::ports::TransportError;

/// Errors returned by calls that go through the authenticated pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The session could not be recovered after a 401.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Input rejected before anything was sent.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// Returns the HTTP status, if the API answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Auth(AuthError::Rejected { status, .. }) => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
