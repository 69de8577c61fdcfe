//! Request execution engine
//!
//! The single callable generated service functions go through:
//! [`execute`] takes the shared [`ClientConfig`] plus one
//! [`OperationDescriptor`] and returns a [`CancelableTask`] for the call.
//!
//! Steps run in a strict sequence: assemble URL and body, resolve headers
//! (awaiting async sources), check cancellation, fold the request
//! interceptor chain, dispatch through the transport (abortable), fold the
//! response interceptor chain, extract and transform the body, classify the
//! status, settle the task. Each await is a suspension point the task can
//! be cancelled at; cancellation before dispatch guarantees the transport
//! is never invoked.

use crate::classify;
use crate::config::ClientConfig;
use crate::descriptor::{OperationDescriptor, ResponseMode};
use crate::error::{ClientError, Result};
use crate::headers::{insert_header, resolve_headers};
use crate::request::{build_url, encode_body};
use crate::response::{ApiResult, ResponseBody, extract_body};
use crate::task::{CancelableTask, TaskContext};
use crate::transport::{EncodedBody, TransportRequest};
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;

/// The value an operation resolves with, shaped by the descriptor's
/// [`ResponseMode`].
#[derive(Debug, Clone)]
pub enum ResultShape {
    /// The extracted body only (`ResponseMode::Body`).
    Body(ResponseBody),
    /// The full result wrapper (`ResponseMode::Full`).
    Full(ApiResult),
}

impl ResultShape {
    /// The body, whichever shape was resolved.
    pub fn into_body(self) -> ResponseBody {
        match self {
            Self::Body(body) => body,
            Self::Full(result) => result.body,
        }
    }

    /// Deserialize the body into a concrete type.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Body(body) => body.json(),
            Self::Full(result) => result.json(),
        }
    }
}

/// Execute one operation. Must be called within a tokio runtime.
///
/// The returned task settles exactly once: with the shaped result, with a
/// classified or transport error, or — if [`CancelableTask::cancel`] is
/// called first — with `ClientError::Cancelled` and no further effects.
pub fn execute(
    config: &Arc<ClientConfig>,
    descriptor: OperationDescriptor,
) -> CancelableTask<ResultShape> {
    let config = Arc::clone(config);
    CancelableTask::spawn(move |task| perform(config, descriptor, task))
}

async fn perform(
    config: Arc<ClientConfig>,
    descriptor: OperationDescriptor,
    task: TaskContext,
) -> Result<ResultShape> {
    // 1. Assemble URL and body; resolve header layers (async sources race
    //    with cancellation through the task's outer select).
    let url = build_url(&config.base_url, &descriptor)?;
    let (body, inferred_content_type) = encode_body(&descriptor.body, descriptor.media_type.as_deref());
    let mut headers = resolve_headers(&config.default_headers, &descriptor.headers).await?;

    tracing::debug!(
        target: "genclient::engine",
        method = %descriptor.method,
        %url,
        "executing operation"
    );

    // An explicit media type on the descriptor replaces whatever the header
    // layers resolved; an inferred one only fills an empty slot.
    if let Some(content_type) = inferred_content_type
        && (descriptor.media_type.is_some() || !headers.contains_key(CONTENT_TYPE))
    {
        insert_header(&mut headers, CONTENT_TYPE.as_str(), &content_type)?;
    }
    // Multipart owns its boundary-bearing Content-Type.
    if matches!(body, EncodedBody::Form(_)) {
        headers.remove(CONTENT_TYPE);
    }

    // 2. Cooperative cancellation check before any network side effect.
    if task.is_cancelled() {
        return Err(ClientError::Cancelled);
    }

    // 3. Request interceptor fold over a per-call snapshot.
    let mut request = TransportRequest {
        method: descriptor.method.clone(),
        url: url.clone(),
        headers,
        body,
    };
    for interceptor in config.request_interceptors.snapshot() {
        request = interceptor.intercept(request)?;
    }

    // 4. Abortable transport dispatch.
    let mut response = config.transport.send(&config, request, &task).await?;

    // 5. Response interceptor fold.
    for interceptor in config.response_interceptors.snapshot() {
        response = interceptor.intercept(response)?;
    }

    // 6. Extract, transform (ok responses only), finalize.
    let ok = response.ok();
    let mut body = extract_body(&response, descriptor.response_header.as_deref())?;
    if ok && let Some(transform) = &descriptor.transform {
        body = transform(body)?;
    }
    let result = ApiResult {
        url,
        ok,
        status: response.status,
        status_text: response.status_text.clone(),
        body,
    };

    // 7. Classify and settle.
    let result = classify::classify(&descriptor.rules, result)?;
    tracing::debug!(
        target: "genclient::engine",
        status = result.status,
        ok = result.ok,
        "operation settled"
    );
    Ok(match descriptor.response_mode {
        ResponseMode::Body => ResultShape::Body(result.body),
        ResponseMode::Full => ResultShape::Full(result),
    })
}
