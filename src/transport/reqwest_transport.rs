//! Bundled reqwest-backed transport.
//!
//! Normalizes `reqwest` responses into [`CanonicalResponse`] and races every
//! await against the task's cancellation signal, so cancelling after
//! dispatch drops the in-flight call (closing the connection) instead of
//! ignoring its result.

use super::{CanonicalResponse, EncodedBody, Transport, TransportRequest};
use crate::config::ClientConfig;
use crate::descriptor::{FormField, FormValue};
use crate::error::{ClientError, Result};
use crate::task::TaskContext;
use async_trait::async_trait;

/// HTTP backend built on a shared [`reqwest::Client`].
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client (connection pool, timeouts, proxy and cookie
    /// behavior all come from it).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish()
    }
}

fn build_form(fields: &[FormField]) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match &field.value {
            FormValue::Text(text) => form.text(field.name.clone(), text.clone()),
            FormValue::Blob {
                data,
                filename,
                content_type,
            } => {
                let mut part = reqwest::multipart::Part::bytes(data.to_vec())
                    .file_name(filename.clone());
                if let Some(ct) = content_type {
                    part = part.mime_str(ct).map_err(|e| {
                        ClientError::InvalidRequest(format!(
                            "Invalid content type '{ct}' for form field '{}': {e}",
                            field.name
                        ))
                    })?;
                }
                form.part(field.name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        _config: &ClientConfig,
        request: TransportRequest,
        task: &TaskContext,
    ) -> Result<CanonicalResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        tracing::debug!(target: "genclient::transport", %method, %url, "dispatching request");

        let mut builder = self.client.request(method, &url).headers(headers);
        builder = match body {
            EncodedBody::None => builder,
            EncodedBody::Json(value) => {
                let payload = serde_json::to_vec(&value).map_err(|e| {
                    ClientError::InvalidRequest(format!("unserializable JSON body: {e}"))
                })?;
                builder.body(payload)
            }
            EncodedBody::Bytes(data) => builder.body(data),
            EncodedBody::Form(fields) => builder.multipart(build_form(&fields)?),
        };

        let response = tokio::select! {
            _ = task.cancelled() => return Err(ClientError::Cancelled),
            result = builder.send() => {
                result.map_err(|e| ClientError::Transport(e.to_string()))?
            }
        };

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = tokio::select! {
            _ = task.cancelled() => return Err(ClientError::Cancelled),
            result = response.bytes() => {
                result.map_err(|e| ClientError::Transport(e.to_string()))?
            }
        };

        tracing::debug!(
            target: "genclient::transport",
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );

        Ok(CanonicalResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: response_headers,
            body,
        })
    }
}
