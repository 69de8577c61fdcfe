//! Client configuration
//!
//! One [`ClientConfig`] exists per configured client module. It is long
//! lived and shared (typically behind an `Arc`) by every generated service
//! function; the request engine only ever reads it. The interceptor
//! registries are the single mutable part and are mutated exclusively
//! through their registration API.

use crate::error::Result;
use crate::interceptor::{InterceptorChain, RequestInterceptor, ResponseInterceptor};
use crate::transport::{ReqwestTransport, Transport};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Credential mode forwarded to transports that distinguish it (cookie and
/// TLS-client-certificate handling is backend-specific; the bundled reqwest
/// transport relies on its client's cookie configuration and ignores this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Omit,
    SameOrigin,
    Include,
}

type ComputeFn = dyn Fn() -> Result<Option<String>> + Send + Sync;
type ResolveFn = dyn Fn() -> BoxFuture<'static, Result<Option<String>>> + Send + Sync;

/// A header value, or a function producing one.
///
/// Resolvers returning `Ok(None)` drop the header instead of sending an
/// empty value. All resolvers run, and async ones are awaited, before the
/// transport call is issued.
#[derive(Clone)]
pub enum HeaderSource {
    /// A plain value.
    Static(String),
    /// A synchronous resolver.
    Compute(Arc<ComputeFn>),
    /// An asynchronous resolver (e.g. a token refresher).
    Resolve(Arc<ResolveFn>),
}

impl HeaderSource {
    pub fn from_static(value: impl Into<String>) -> Self {
        Self::Static(value.into())
    }

    pub fn compute<F>(resolver: F) -> Self
    where
        F: Fn() -> Result<Option<String>> + Send + Sync + 'static,
    {
        Self::Compute(Arc::new(resolver))
    }

    pub fn resolve<F, Fut>(resolver: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Option<String>>> + Send + 'static,
    {
        Self::Resolve(Arc::new(move || Box::pin(resolver())))
    }

    pub(crate) async fn value(&self) -> Result<Option<String>> {
        match self {
            Self::Static(value) => Ok(Some(value.clone())),
            Self::Compute(resolver) => resolver(),
            Self::Resolve(resolver) => resolver().await,
        }
    }
}

impl From<&str> for HeaderSource {
    fn from(value: &str) -> Self {
        Self::Static(value.to_string())
    }
}

impl From<String> for HeaderSource {
    fn from(value: String) -> Self {
        Self::Static(value)
    }
}

impl std::fmt::Debug for HeaderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
            Self::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

/// Shared configuration for one generated client.
pub struct ClientConfig {
    /// Base URL prefixed to every operation path.
    pub base_url: String,
    /// Credential mode (transport-specific meaning).
    pub credentials: Credentials,
    /// Default headers layered under per-request headers.
    pub default_headers: Vec<(String, HeaderSource)>,
    /// HTTP backend, selected at client construction time.
    pub transport: Arc<dyn Transport>,
    /// Request interceptor chain (order preserved).
    pub request_interceptors: InterceptorChain<dyn RequestInterceptor>,
    /// Response interceptor chain (order preserved).
    pub response_interceptors: InterceptorChain<dyn ResponseInterceptor>,
}

impl ClientConfig {
    /// Start building a configuration for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("default_headers", &self.default_headers)
            .field("request_interceptors", &self.request_interceptors)
            .field("response_interceptors", &self.response_interceptors)
            .finish()
    }
}

/// Builder for [`ClientConfig`] to construct configuration in a unified and
/// safe way.
pub struct ClientConfigBuilder {
    base_url: String,
    credentials: Credentials,
    default_headers: Vec<(String, HeaderSource)>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientConfigBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::default(),
            default_headers: Vec::new(),
            transport: None,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Add a static default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers
            .push((name.into(), HeaderSource::Static(value.into())));
        self
    }

    /// Add a default header from any [`HeaderSource`].
    pub fn header_source(mut self, name: impl Into<String>, source: HeaderSource) -> Self {
        self.default_headers.push((name.into(), source));
        self
    }

    /// Select the HTTP backend. Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url,
            credentials: self.credentials,
            default_headers: self.default_headers,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::default())),
            request_interceptors: InterceptorChain::new(),
            response_interceptors: InterceptorChain::new(),
        }
    }
}
