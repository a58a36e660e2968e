//! # Join counter shared by the units of one runner or group.
//!
//! [`JoinCounter`] is the only shared mutable state in the crate: an atomic count of
//! outstanding units plus a [`Notify`] that wakes every waiter when the count drains.
//!
//! ## Rules
//! - `add(n)` happens **before** the units it accounts for are spawned
//! - every registered unit owns exactly one [`JoinGuard`]; dropping it decrements once
//! - the guard drops on every exit path: normal return, recovered panic, unwinding panic
//! - reaching zero is the sole "all done" signal; waiters re-check after each wakeup
//!
//! ```text
//! add(3) ──► [3] ──guard drop──► [2] ──guard drop──► [1] ──guard drop──► [0] ──► notify_waiters()
//!                                                                                │
//!                                                             wait() ◄───────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    zero: Notify,
}

/// Shared count of outstanding units.
///
/// Cheap to clone; all clones observe the same count.
#[derive(Clone, Debug, Default)]
pub(crate) struct JoinCounter {
    inner: Arc<Inner>,
}

impl JoinCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `n` more outstanding units.
    pub(crate) fn add(&self, n: usize) {
        self.inner.pending.fetch_add(n, Ordering::AcqRel);
    }

    /// Hands out the completion guard for one unit previously registered with [`add`](Self::add).
    pub(crate) fn guard(&self) -> JoinGuard {
        JoinGuard {
            counter: self.clone(),
        }
    }

    /// Number of units that have not completed yet.
    pub(crate) fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Resolves once the count is zero.
    ///
    /// Returns immediately when nothing is outstanding.
    pub(crate) async fn wait(&self) {
        loop {
            let notified = self.inner.zero.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a drain between the check and the
            // await still wakes us.
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn done(&self) {
        let prev = self.inner.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "join counter decremented below zero");
        if prev == 1 {
            self.inner.zero.notify_waiters();
        }
    }
}

/// Decrements its [`JoinCounter`] exactly once, when dropped.
#[derive(Debug)]
pub(crate) struct JoinGuard {
    counter: JoinCounter,
}

impl Drop for JoinGuard {
    fn drop(&mut self) {
        self.counter.done();
    }
}
