//! Task plumbing shared by the dispatch crates.
//!
//! Job drivers and result adapters run as Tokio tasks spawned through
//! [`spawn`]. A driver keeps its in-flight operations in a [`JoinSet`] so a
//! failure or cancellation can drop them in one call, and a statement's
//! cancellation travels from a [`CancellationHandle`] to every task through a
//! `watch` channel.

use std::future::Future;

use common_error::{TesseraError, TesseraResult};
use tokio::runtime::Runtime;
use tokio::sync::watch;

/// A fresh multi-threaded runtime, for callers outside any runtime.
pub fn get_runtime() -> TesseraResult<Runtime> {
    Runtime::new().map_err(|e| TesseraError::internal(format!("Failed to create runtime: {e}")))
}

/// Spawn a task on the current runtime.
///
/// Panics outside a Tokio runtime, like [`tokio::spawn`].
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}

/// In-flight work of one job.
pub struct JoinSet<T> {
    inner: tokio::task::JoinSet<T>,
}

impl<T: Send + 'static> JoinSet<T> {
    /// Create a new join set.
    pub fn new() -> Self {
        Self {
            inner: tokio::task::JoinSet::new(),
        }
    }

    /// Spawn a task into the set.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.inner.spawn(future);
    }

    /// Wait for the next task to complete.
    pub async fn join_next(&mut self) -> Option<Result<T, tokio::task::JoinError>> {
        self.inner.join_next().await
    }

    /// Abort every task still running in the set.
    ///
    /// Aborted tasks never report their output.
    pub fn abort_all(&mut self) {
        self.inner.abort_all();
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Send + 'static> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Handle for cancelling an execution.
///
/// The handle lives outside the execution; receivers obtained from
/// [`CancellationHandle::subscribe`] observe the signal cooperatively.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    cancel_tx: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Create a new cancellation handle and receiver.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { cancel_tx: tx }, rx)
    }

    /// Signal cancellation to every receiver.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Another receiver for the same signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.cancel_tx.subscribe()
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new().0
    }
}

/// Wait until the receiver observes cancellation.
///
/// Never resolves if the handle is dropped without cancelling.
pub async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
