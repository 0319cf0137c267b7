// src/api/request.rs
//! Cancellable request handles with an at-most-once completion.
//!
//! Every operation is spawned onto the runtime and a [`RequestHandle`] is
//! handed back straight away. The handle and the task race on a single
//! atomic state word: whichever moves it out of `Pending` first decides
//! whether the completion fires (`Delivered`) or never does (`Cancelled`).

use crate::error::AppError;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const PENDING: u8 = 0;
const DELIVERED: u8 = 1;
const CANCELLED: u8 = 2;

/// Where a request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Delivered,
    Cancelled,
}

#[derive(Debug)]
struct HandleInner {
    id: Uuid,
    token: CancellationToken,
    state: AtomicU8,
}

/// Handle to one in-flight operation.
///
/// Clones refer to the same request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    inner: Arc<HandleInner>,
}

impl RequestHandle {
    fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                token: CancellationToken::new(),
                state: AtomicU8::new(PENDING),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Cancels the request if its result has not been delivered yet.
    ///
    /// Returns `true` when this call cancelled the request. Cancelling a
    /// delivered or already cancelled request does nothing and returns
    /// `false`.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .inner
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if cancelled {
            self.inner.token.cancel();
            log::debug!("Request {} cancelled", self.inner.id);
        }
        cancelled
    }

    pub fn state(&self) -> RequestState {
        match self.inner.state.load(Ordering::Acquire) {
            PENDING => RequestState::Pending,
            DELIVERED => RequestState::Delivered,
            _ => RequestState::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == RequestState::Cancelled
    }

    /// Whether the completion has fired.
    pub fn is_finished(&self) -> bool {
        self.state() == RequestState::Delivered
    }

    /// Claims the right to deliver. Fails once the request was cancelled.
    fn try_deliver(&self) -> bool {
        self.inner
            .state
            .compare_exchange(PENDING, DELIVERED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Starts `operation` and calls `completion` with its result exactly once,
/// unless the returned handle is cancelled first.
///
/// Cancelling drops `operation` at its next suspension point. Must be
/// called from within a tokio runtime.
pub fn issue_with<T, Fut, F>(operation: Fut, completion: F) -> RequestHandle
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    F: FnOnce(Result<T, AppError>) + Send + 'static,
{
    let handle = RequestHandle::new();
    let task_handle = handle.clone();
    let token = handle.inner.token.clone();
    log::debug!("Request {} issued", handle.id());

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::debug!("Request {} dropped before delivery", task_handle.id());
            }
            result = operation => {
                if task_handle.try_deliver() {
                    if let Err(e) = &result {
                        log::debug!("Request {} failed: {}", task_handle.id(), e);
                    }
                    completion(result);
                } else {
                    log::debug!("Request {} produced a result after cancellation; discarded", task_handle.id());
                }
            }
        }
    });

    handle
}

/// Awaitable form of [`issue_with`].
pub fn issue<T, Fut>(operation: Fut) -> (RequestHandle, Completion<T>)
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let handle = issue_with(operation, move |result| {
        let _ = tx.send(result);
    });
    (handle, Completion { rx })
}

/// The single-fire result of an issued request.
///
/// Resolves to `Some(result)` once, or to `None` when the request was
/// cancelled before it could deliver.
#[derive(Debug)]
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T, AppError>>,
}

impl<T> Future for Completion<T> {
    type Output = Option<Result<T, AppError>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    /// Sets a flag when dropped, to observe that a cancelled operation was aborted.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_completion_delivers_result() {
        let (handle, completion) = issue(async { Ok(42) });

        assert_eq!(completion.await.map(|r| r.unwrap()), Some(42));
        assert!(handle.is_finished());
        assert!(!handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_errors_are_delivered_through_completion() {
        let (_handle, completion) = issue::<(), _>(async { Err(AppError::transport("boom")) });

        match completion.await {
            Some(Err(AppError::TransportFailure { message, .. })) => assert_eq!(message, "boom"),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_in_time_never_completes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let (_release, wait) = oneshot::channel::<()>();

        let guard = DropFlag(Arc::clone(&dropped));
        let counter = Arc::clone(&calls);
        let handle = issue_with(
            async move {
                let _guard = guard;
                let _ = wait.await;
                Ok(())
            },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.cancel());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(dropped.load(Ordering::SeqCst));
        assert_eq!(handle.state(), RequestState::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_before_first_poll_yields_none() {
        let (handle, completion) = issue(async { Ok("never") });
        assert!(handle.cancel());

        assert!(completion.await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_after_delivery_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = oneshot::channel();
        let counter = Arc::clone(&calls);

        let handle = issue_with(async { Ok(7) }, move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = done_tx.send(result.unwrap());
        });

        assert_eq!(done_rx.await.unwrap(), 7);
        assert!(!handle.cancel());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_double_cancel_is_idempotent() {
        let (handle, completion) = issue(std::future::pending::<Result<(), AppError>>());

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(handle.clone().is_cancelled());
        assert!(completion.await.is_none());
    }

    #[tokio::test]
    async fn test_handles_have_distinct_ids() {
        let (a, _) = issue(async { Ok(()) });
        let (b, _) = issue(async { Ok(()) });
        assert_ne!(a.id(), b.id());
    }
}
