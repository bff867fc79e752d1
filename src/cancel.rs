//! Caller-owned cancellation handles.
//!
//! A view creates one [`CancelHandle`] and passes it to every call it makes.
//! Cancelling the handle aborts all of those calls at their next suspension
//! point (network I/O or retry backoff) without reporting an error.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Error returned when a future loses the race against its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Shared cancellation handle. Clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every outstanding call sharing this handle.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel this handle and return a fresh one for the next cycle.
    ///
    /// Polling loops use this so a late result from the previous cycle is
    /// never acted upon.
    pub fn renew(&mut self) -> CancelHandle {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.clone()
    }

    /// Handle that is cancelled with this one but can also be cancelled alone.
    pub fn child(&self) -> CancelHandle {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Resolves once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Race `future` against this handle.
    ///
    /// Cancellation wins ties so a result settling after cancellation is
    /// dropped.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }
}

/// Run `future` under an optional handle.
pub(crate) async fn run_cancellable<F>(
    handle: Option<&CancelHandle>,
    future: F,
) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    match handle {
        Some(handle) => handle.run(future).await,
        None => Ok(future.await),
    }
}
