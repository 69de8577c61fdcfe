//! HTTP transport abstraction
//!
//! The engine is agnostic to the underlying HTTP backend: it hands a
//! [`TransportRequest`] to an injectable [`Transport`] and gets back a
//! [`CanonicalResponse`] normalized to status/headers/bytes. Concrete
//! backends (the bundled reqwest one, or a synthetic transport in tests)
//! implement [`Transport::send`] and must observe the task's cancellation
//! signal so an in-flight call is aborted rather than merely ignored.

use crate::config::ClientConfig;
use crate::descriptor::FormField;
use crate::error::Result;
use crate::task::TaskContext;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::HeaderMap;

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

/// Encoded request body handed to the transport.
///
/// Multipart bodies stay declarative here (native multipart forms are
/// neither clonable nor inspectable); the backend materializes them at send
/// time.
#[derive(Debug, Clone)]
pub enum EncodedBody {
    /// No body; no Content-Type is attached for this variant.
    None,
    /// JSON payload, serialized by the backend.
    Json(serde_json::Value),
    /// Raw binary payload.
    Bytes(Bytes),
    /// Multipart form fields in declaration order.
    Form(Vec<FormField>),
}

impl EncodedBody {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// The fully assembled outgoing request. This is the value the request
/// interceptor chain folds over.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: EncodedBody,
}

/// Transport-agnostic response: status line, headers and the raw body bytes,
/// not yet parsed to their final shape.
#[derive(Debug, Clone)]
pub struct CanonicalResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CanonicalResponse {
    /// Whether the status code is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Pluggable HTTP backend.
///
/// Implementations must register with (or select against) the task's
/// cancellation signal so that cancelling the task after dispatch aborts the
/// underlying network call. A transport-level failure is reported as
/// `ClientError::Transport` and never reaches the status classifier.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        config: &ClientConfig,
        request: TransportRequest,
        task: &TaskContext,
    ) -> Result<CanonicalResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn ok_tracks_2xx_range() {
        let mut resp = CanonicalResponse {
            status: 204,
            status_text: "No Content".into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(resp.ok());
        resp.status = 301;
        assert!(!resp.ok());
        resp.status = 199;
        assert!(!resp.ok());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-Id", HeaderValue::from_static("abc-123"));
        let resp = CanonicalResponse {
            status: 200,
            status_text: "OK".into(),
            headers,
            body: Bytes::new(),
        };
        assert_eq!(resp.header("x-request-id"), Some("abc-123"));
        assert_eq!(resp.header("missing"), None);
    }
}
