//! Cancellation of blocking fifo calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::fifo::Shared;

/// A cancellation token for blocking fifo calls.
///
/// A blocking [`Fifo`](crate::Fifo) call registers itself with the token it
/// was given before first inspecting the buffer, and deregisters on every
/// exit path. [`interrupt`](Self::interrupt) fires the token and wakes all
/// registered waiters; a woken call returns
/// [`FifoError::Interrupted`](crate::FifoError::Interrupted) without having
/// moved any bytes.
///
/// The token is `Clone` and shares its state, so one side can hold it while
/// another thread delivers the interruption. A fired token stays fired
/// until [`reset`](Self::reset); while fired, blocking calls that would
/// have to wait return `Interrupted` instead of suspending. Non-blocking
/// (`try_*`) calls never consult the token.
#[derive(Clone, Default)]
pub struct InterruptToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    fired: AtomicBool,
    // Fifos with a call currently registered on this token. A fifo appears
    // once per in-flight call.
    waiters: Mutex<Vec<Arc<Shared>>>,
}

impl InterruptToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the token has fired and not been reset.
    pub fn is_interrupted(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Fires the token and wakes every registered waiter.
    ///
    /// The flag is set before any wakeup, and each waiter's own mutex is
    /// taken briefly before notifying it, so a call between its flag check
    /// and its wait cannot miss the interruption.
    pub fn interrupt(&self) {
        self.inner.fired.store(true, Ordering::SeqCst);
        // Snapshot under the waiter lock, notify outside it, so this never
        // holds both the waiter lock and a fifo lock at once.
        let watched: Vec<Arc<Shared>> = self.inner.waiters.lock().clone();
        for shared in watched {
            drop(shared.state.lock());
            shared.not_empty.notify_all();
            shared.not_full.notify_all();
        }
    }

    /// Re-arms a fired token so it can be used for further calls.
    pub fn reset(&self) {
        self.inner.fired.store(false, Ordering::SeqCst);
    }

    pub(crate) fn register(&self, shared: &Arc<Shared>) -> WaitGuard<'_> {
        self.inner.waiters.lock().push(Arc::clone(shared));
        WaitGuard {
            token: self,
            shared: Arc::clone(shared),
        }
    }
}

/// Deregisters a waiter when the fifo call returns, on every exit path.
pub(crate) struct WaitGuard<'a> {
    token: &'a InterruptToken,
    shared: Arc<Shared>,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        let mut waiters = self.token.inner.waiters.lock();
        if let Some(i) = waiters.iter().position(|w| Arc::ptr_eq(w, &self.shared)) {
            waiters.swap_remove(i);
        }
    }
}
