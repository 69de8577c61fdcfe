//! Response resolution
//!
//! Extracts the raw transport body into its final shape according to the
//! response Content-Type (JSON, text, binary), with an optional descriptor
//! override that reads the body from a designated response header instead.
//! The extracted body plus the status line form an [`ApiResult`], the value
//! handed to the status classifier.

use crate::error::{ClientError, Result};
use crate::transport::CanonicalResponse;
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Extracted response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Empty body (e.g. 204 No Content).
    Empty,
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body read as text (`text/*` content types, or a header-override body).
    Text(String),
    /// Anything else, kept as raw bytes.
    Binary(Bytes),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Deserialize a JSON body into a concrete type. Generated service
    /// functions use this to produce their typed return values.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| ClientError::Parse(format!("JSON body mismatch: {e}"))),
            Self::Empty => Err(ClientError::Parse("empty body, expected JSON".into())),
            Self::Text(_) => Err(ClientError::Parse("text body, expected JSON".into())),
            Self::Binary(_) => Err(ClientError::Parse("binary body, expected JSON".into())),
        }
    }

    /// The JSON value, if this body was parsed as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this body was read as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Final outcome container handed to the classifier and, in `Full` response
/// mode, returned to the caller.
#[derive(Debug, Clone)]
pub struct ApiResult {
    /// The request URL (after path substitution and query building).
    pub url: String,
    /// Whether the status code was in the 2xx range.
    pub ok: bool,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Extracted (and possibly transformed) body.
    pub body: ResponseBody,
}

impl ApiResult {
    /// Deserialize the body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.body.json()
    }
}

/// Extract the body from a canonical response.
///
/// If `response_header` names a header present on the response, its value
/// becomes the body (as text) and the payload is not parsed at all.
/// Otherwise extraction is driven by Content-Type: JSON media types are
/// parsed, `text/*` is read as UTF-8 text, anything else stays binary. An
/// empty payload extracts to [`ResponseBody::Empty`].
pub fn extract_body(
    response: &CanonicalResponse,
    response_header: Option<&str>,
) -> Result<ResponseBody> {
    if let Some(name) = response_header
        && let Some(value) = response.header(name)
    {
        return Ok(ResponseBody::Text(value.to_string()));
    }

    if response.body.is_empty() {
        return Ok(ResponseBody::Empty);
    }

    let content_type = response
        .header(reqwest::header::CONTENT_TYPE.as_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if is_json_media_type(&content_type) {
        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::Parse(format!("invalid JSON body: {e}")))?;
        Ok(ResponseBody::Json(value))
    } else if content_type.starts_with("text/") {
        Ok(ResponseBody::Text(
            String::from_utf8_lossy(&response.body).into_owned(),
        ))
    } else {
        Ok(ResponseBody::Binary(response.body.clone()))
    }
}

/// `application/json` and structured suffixes like `application/problem+json`.
fn is_json_media_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    media_type.ends_with("/json") || media_type.ends_with("+json")
}
