//! Cancelable task primitive
//!
//! A `CancelableTask<T>` wraps an asynchronous unit of work that can be
//! cancelled before or during execution. It is the single concurrency
//! abstraction of the engine; everything downstream is sequential glue.
//!
//! The task is a state machine {pending, settled, cancelled}. Cancelling a
//! pending task runs every cleanup hook registered through [`TaskContext`]
//! exactly once, wakes awaiting callers with `ClientError::Cancelled`, and
//! suppresses any later settle attempt from the work itself. Cancelling an
//! already-settled or already-cancelled task is a no-op.

use crate::error::{ClientError, Result};
use std::future::{Future, IntoFuture};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Settled,
    Cancelled,
}

type Cleanup = Box<dyn FnOnce() + Send>;

struct Inner {
    phase: Phase,
    /// Hooks registered while pending; drained and invoked on cancel,
    /// discarded on settle.
    cleanups: Vec<Cleanup>,
}

struct Shared {
    inner: Mutex<Inner>,
    token: CancellationToken,
}

impl Shared {
    fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: Phase::Pending,
                cleanups: Vec::new(),
            }),
            token: CancellationToken::new(),
        }
    }

    /// Transition pending -> settled. Returns false if the task is no longer
    /// pending, in which case the caller must discard its outcome.
    fn try_settle(&self) -> bool {
        let mut inner = self.inner.lock().expect("task state mutex poisoned");
        if inner.phase != Phase::Pending {
            return false;
        }
        inner.phase = Phase::Settled;
        inner.cleanups.clear();
        true
    }

    /// Transition pending -> cancelled, firing the token and draining hooks.
    fn cancel(&self) {
        let cleanups = {
            let mut inner = self.inner.lock().expect("task state mutex poisoned");
            if inner.phase != Phase::Pending {
                return;
            }
            inner.phase = Phase::Cancelled;
            std::mem::take(&mut inner.cleanups)
        };
        self.token.cancel();
        for cleanup in cleanups {
            cleanup();
        }
    }

    fn phase(&self) -> Phase {
        self.inner.lock().expect("task state mutex poisoned").phase
    }
}

/// A clonable handle that can cancel the task from anywhere.
#[derive(Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Request cancellation. No-op once the task has settled or was already
    /// cancelled.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.shared.phase() == Phase::Cancelled
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("phase", &self.shared.phase())
            .finish()
    }
}

/// Capability handed to the running work: cancellation checks, a wait
/// future, and cleanup-hook registration.
#[derive(Clone)]
pub struct TaskContext {
    shared: Arc<Shared>,
}

impl TaskContext {
    /// Whether the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shared.phase() == Phase::Cancelled
    }

    /// Resolves when cancellation is requested. Suitable for `tokio::select!`
    /// against in-flight I/O.
    pub async fn cancelled(&self) {
        self.shared.token.cancelled().await;
    }

    /// Register a cleanup hook to run on cancellation (e.g. aborting an
    /// in-flight network call). Multiple registrations are allowed; all run
    /// exactly once on cancel. Registering after cancellation runs the hook
    /// immediately; after settle it is discarded.
    pub fn on_cancel(&self, cleanup: impl FnOnce() + Send + 'static) {
        let run_now = {
            let mut inner = self
                .shared
                .inner
                .lock()
                .expect("task state mutex poisoned");
            match inner.phase {
                Phase::Pending => {
                    inner.cleanups.push(Box::new(cleanup));
                    return;
                }
                Phase::Cancelled => true,
                Phase::Settled => false,
            }
        };
        if run_now {
            cleanup();
        }
    }
}

/// Promise-like handle for one in-flight operation.
///
/// Await it (or call [`CancelableTask::join`]) for the outcome; cancellation
/// surfaces as `Err(ClientError::Cancelled)`. Exactly one settle is ever
/// observed per task.
pub struct CancelableTask<T> {
    shared: Arc<Shared>,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> CancelableTask<T> {
    /// Spawn the work on the current tokio runtime.
    ///
    /// The work receives a [`TaskContext`] and is raced against the
    /// cancellation token, so a cancelled task stops at its next suspension
    /// point even if it never checks the context.
    pub fn spawn<F, Fut>(work: F) -> Self
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let (tx, rx) = oneshot::channel();
        let ctx = TaskContext {
            shared: Arc::clone(&shared),
        };
        let token = shared.token.clone();
        let settle = Arc::clone(&shared);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                outcome = work(ctx) => {
                    if settle.try_settle() {
                        let _ = tx.send(outcome);
                    }
                }
            }
        });
        Self { shared, rx }
    }

    /// Request cancellation of the task.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.shared.phase() == Phase::Cancelled
    }

    /// A clonable handle for cancelling from another task or thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Wait for the outcome. Returns `ClientError::Cancelled` if the task was
    /// (or becomes) cancelled before settling.
    pub async fn join(self) -> Result<T> {
        let Self { shared, rx } = self;
        tokio::select! {
            biased;
            outcome = rx => outcome.unwrap_or(Err(ClientError::Cancelled)),
            _ = shared.token.cancelled() => Err(ClientError::Cancelled),
        }
    }
}

impl<T: Send + 'static> IntoFuture for CancelableTask<T> {
    type Output = Result<T>;
    type IntoFuture = futures::future::BoxFuture<'static, Result<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.join())
    }
}

impl<T> std::fmt::Debug for CancelableTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelableTask")
            .field("phase", &self.shared.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_with_work_outcome() {
        let task = CancelableTask::spawn(|_ctx| async { Ok(21 * 2) });
        assert_eq!(task.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancel_wakes_pending_join_immediately() {
        let task: CancelableTask<()> = CancelableTask::spawn(|ctx| async move {
            ctx.cancelled().await;
            // Suppressed by the state machine even if we reach this point.
            Ok(())
        });
        let handle = task.cancel_handle();

        let waiter = tokio::spawn(task.join());
        tokio::task::yield_now().await;
        handle.cancel();

        let out = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("cancel should wake the waiting task")
            .expect("task ok");
        assert!(matches!(out, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn cleanup_hooks_run_exactly_once_each() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_work = Arc::clone(&hits);
        let task: CancelableTask<()> = CancelableTask::spawn(move |ctx| async move {
            let a = Arc::clone(&hits_in_work);
            ctx.on_cancel(move || {
                a.fetch_add(1, Ordering::SeqCst);
            });
            let b = hits_in_work;
            ctx.on_cancel(move || {
                b.fetch_add(1, Ordering::SeqCst);
            });
            futures::future::pending::<()>().await;
            Ok(())
        });
        tokio::task::yield_now().await;

        task.cancel();
        // Second cancel is a no-op.
        task.cancel();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(task.is_cancelled());
    }

    #[tokio::test]
    async fn hook_registered_after_cancel_runs_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (ready_tx, ready_rx) = oneshot::channel::<TaskContext>();
        let task: CancelableTask<()> = CancelableTask::spawn(move |ctx| async move {
            let _ = ready_tx.send(ctx.clone());
            futures::future::pending::<()>().await;
            Ok(())
        });
        let ctx = ready_rx.await.expect("work started");

        task.cancel();
        let late = Arc::clone(&hits);
        ctx.on_cancel(move || {
            late.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_after_settle_is_noop() {
        let task = CancelableTask::spawn(|_ctx| async { Ok("done") });
        let handle = task.cancel_handle();
        let out = task.await.unwrap();
        assert_eq!(out, "done");
        handle.cancel();
        assert!(!handle.is_cancelled());
    }

    #[tokio::test]
    async fn settle_after_cancel_is_suppressed() {
        let (go_tx, go_rx) = oneshot::channel::<()>();
        let task = CancelableTask::spawn(move |_ctx| async move {
            let _ = go_rx.await;
            Ok(7)
        });
        task.cancel();
        let _ = go_tx.send(());
        assert!(matches!(task.join().await, Err(ClientError::Cancelled)));
    }
}
