//! Interceptor pipeline
//!
//! Ordered, externally mutable chains of request/response transforms.
//! Request interceptors run after assembly and header resolution,
//! immediately before dispatch; response interceptors run after the
//! transport returns and before body extraction. Both are left folds:
//! for a chain `[f1, f2, f3]` the observed transformation is
//! `f3(f2(f1(x)))`. An interceptor that fails short-circuits the rest of
//! its chain and the whole operation, bypassing the status classifier.
//!
//! Chains are owned by the [`ClientConfig`](crate::config::ClientConfig)
//! and mutated only through `register`/`unregister`; the engine takes a
//! snapshot before iterating, so mid-call registrations never affect an
//! in-flight call.

use crate::error::Result;
use crate::transport::{CanonicalResponse, TransportRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Transforms the outgoing request before dispatch.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: TransportRequest) -> Result<TransportRequest>;
}

impl<F> RequestInterceptor for F
where
    F: Fn(TransportRequest) -> Result<TransportRequest> + Send + Sync,
{
    fn intercept(&self, request: TransportRequest) -> Result<TransportRequest> {
        self(request)
    }
}

/// Transforms the incoming response before body extraction.
pub trait ResponseInterceptor: Send + Sync {
    fn intercept(&self, response: CanonicalResponse) -> Result<CanonicalResponse>;
}

impl<F> ResponseInterceptor for F
where
    F: Fn(CanonicalResponse) -> Result<CanonicalResponse> + Send + Sync,
{
    fn intercept(&self, response: CanonicalResponse) -> Result<CanonicalResponse> {
        self(response)
    }
}

/// Token returned by [`InterceptorChain::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

/// Ordered, append-only registration list. Insertion order defines
/// invocation order; no deduplication — registering the same interceptor
/// twice produces two invocations.
pub struct InterceptorChain<T: ?Sized> {
    entries: RwLock<Vec<(u64, Arc<T>)>>,
    next_id: AtomicU64,
}

impl<T: ?Sized> InterceptorChain<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Append an interceptor to the chain.
    pub fn register(&self, interceptor: Arc<T>) -> InterceptorId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .expect("interceptor chain lock poisoned")
            .push((id, interceptor));
        InterceptorId(id)
    }

    /// Remove a previously registered interceptor. Returns false if the id
    /// was already removed or never existed.
    pub fn unregister(&self, id: InterceptorId) -> bool {
        let mut entries = self
            .entries
            .write()
            .expect("interceptor chain lock poisoned");
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id.0);
        entries.len() != before
    }

    /// Consistent copy of the chain for one call; registrations made after
    /// the snapshot do not affect that call.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries
            .read()
            .expect("interceptor chain lock poisoned")
            .iter()
            .map(|(_, interceptor)| Arc::clone(interceptor))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("interceptor chain lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for InterceptorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for InterceptorChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.len())
            .finish()
    }
}
