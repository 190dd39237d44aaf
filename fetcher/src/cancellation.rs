//! Cooperative cancellation for in-flight requests.
//!
//! A [`CancellationHandle`] is a shared "is-cancelled" flag plus a list of
//! wakers. Signalling flips the flag once and wakes every task awaiting
//! [`CancellationHandle::cancelled`]. It is not tied to any async runtime, so
//! the same handle works under yew's local spawner and under a tokio
//! `LocalSet`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Handle used to signal abandonment of one request.
///
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct CancellationHandle {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: Cell<bool>,
    waiters: RefCell<Vec<Waker>>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn signal(&self) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        for waker in waiters {
            waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// Future that resolves once [`signal`](Self::signal) has been called.
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            handle: self.clone(),
        }
    }
}

impl fmt::Debug for CancellationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancellationHandle::cancelled`].
#[must_use = "futures do nothing unless polled"]
pub struct Cancelled {
    handle: CancellationHandle,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.handle.is_cancelled() {
            return Poll::Ready(());
        }
        let mut waiters = self.handle.inner.waiters.borrow_mut();
        if !waiters.iter().any(|waker| waker.will_wake(cx.waker())) {
            waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
