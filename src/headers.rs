//! Header resolution
//!
//! Produces the final header set for one call by layering config-level
//! default headers under per-request headers. Every [`HeaderSource`] is
//! resolved first — async resolvers concurrently, since they are
//! independent — and only then merged, so the transport is never dispatched
//! with resolution still pending. Later layers override earlier ones on
//! case-insensitive key collision; a source resolving to `None` is dropped
//! rather than sent empty.

use crate::config::HeaderSource;
use crate::error::{ClientError, Result};
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Resolve and merge the default and per-request header layers.
pub async fn resolve_headers(
    defaults: &[(String, HeaderSource)],
    per_request: &[(String, HeaderSource)],
) -> Result<HeaderMap> {
    let layered = defaults.iter().chain(per_request.iter());
    let resolved = try_join_all(layered.map(|(name, source)| async move {
        Ok::<_, ClientError>((name.as_str(), source.value().await?))
    }))
    .await?;

    let mut headers = HeaderMap::new();
    for (name, value) in resolved {
        let Some(value) = value else { continue };
        insert_header(&mut headers, name, &value)?;
    }
    Ok(headers)
}

/// Insert one header, replacing any case-insensitive duplicate.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::InvalidRequest(format!("Invalid header name '{name}': {e}")))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        ClientError::InvalidRequest(format!("Invalid header value for '{name}': {e}"))
    })?;
    headers.insert(header_name, header_value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(name: &str, source: HeaderSource) -> (String, HeaderSource) {
        (name.to_string(), source)
    }

    #[tokio::test]
    async fn per_request_overrides_defaults_case_insensitively() {
        let defaults = vec![
            entry("X-Api-Version", HeaderSource::from_static("1")),
            entry("Accept", HeaderSource::from_static("application/json")),
        ];
        let per_request = vec![entry("x-api-version", HeaderSource::from_static("2"))];

        let headers = resolve_headers(&defaults, &per_request).await.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-api-version").unwrap(), "2");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn async_resolvers_are_awaited_before_merging() {
        let defaults = vec![entry(
            "authorization",
            HeaderSource::resolve(|| async {
                tokio::task::yield_now().await;
                Ok(Some("Bearer token-1".to_string()))
            }),
        )];
        let headers = resolve_headers(&defaults, &[]).await.unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token-1");
    }

    #[tokio::test]
    async fn none_values_are_dropped() {
        let defaults = vec![
            entry("x-optional", HeaderSource::compute(|| Ok(None))),
            entry("x-present", HeaderSource::from_static("yes")),
        ];
        let headers = resolve_headers(&defaults, &[]).await.unwrap();
        assert_eq!(headers.len(), 1);
        assert!(headers.get("x-optional").is_none());
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_resolver = Arc::clone(&calls);
        let defaults = vec![
            entry("x-static", HeaderSource::from_static("s")),
            entry(
                "x-dynamic",
                HeaderSource::resolve(move || {
                    let calls = Arc::clone(&calls_in_resolver);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(Some("d".to_string()))
                    }
                }),
            ),
        ];

        let first = resolve_headers(&defaults, &[]).await.unwrap();
        let second = resolve_headers(&defaults, &[]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolver_errors_propagate() {
        let defaults = vec![entry(
            "authorization",
            HeaderSource::compute(|| {
                Err(ClientError::InvalidRequest("token store empty".into()))
            }),
        )];
        assert!(matches!(
            resolve_headers(&defaults, &[]).await,
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn invalid_header_name_is_rejected() {
        let defaults = vec![entry("bad name", HeaderSource::from_static("v"))];
        assert!(matches!(
            resolve_headers(&defaults, &[]).await,
            Err(ClientError::InvalidRequest(_))
        ));
    }
}
