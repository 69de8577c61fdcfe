//! Error Handling Module
//!
//! Defines the error taxonomy surfaced by the request engine:
//! - `ClientError::Cancelled` for cooperatively cancelled calls
//! - `ClientError::Transport` for network-level failures and aborts
//! - `ClientError::Api` for status codes classified as failures
//! - `ClientError::InvalidRequest` / `ClientError::Parse` for local problems
//!
//! Interceptor failures are not a dedicated variant: an interceptor returns
//! whatever `ClientError` it likes and that value propagates verbatim.

use crate::response::ResponseBody;
use thiserror::Error;

/// Structured failure produced by the status classifier.
///
/// Carries everything a caller needs to branch on a server-side failure:
/// the request URL, the status line, the (possibly transformed) body and the
/// message of the matched classifier rule.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Request URL that produced the failure
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// HTTP status text (canonical reason phrase if the server sent none)
    pub status_text: String,
    /// Extracted response body
    pub body: ResponseBody,
    /// Message of the matched classifier rule
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)
    }
}

/// Errors that can occur while executing an operation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The task was cancelled before it settled.
    #[error("Request cancelled")]
    Cancelled,

    /// Network-level failure or programmatic abort inside the transport.
    /// Never produced by the status classifier.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Status code classified as a failure by the descriptor's rule table.
    #[error("API error: {0}")]
    Api(ApiError),

    /// The descriptor or configuration could not be turned into a request
    /// (missing path parameter, invalid header name, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded according to its content type.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Build a classified API error.
    pub fn api_error(
        url: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        body: ResponseBody,
        message: impl Into<String>,
    ) -> Self {
        Self::Api(ApiError {
            url: url.into(),
            status,
            status_text: status_text.into(),
            body,
            message: message.into(),
        })
    }

    /// Whether this error represents a cancelled task.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Status code for classified API errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ClientError>;
