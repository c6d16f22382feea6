//! Single-slot asynchronous wake-up gate.
//!
//! [`AutoResetSignal`] holds at most one outstanding release. `set` either
//! wakes the parked waiter or arms the gate so the next `wait` completes
//! immediately; repeated `set` calls with nobody waiting coalesce into a
//! single release.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use crate::sync::Mutex;

struct SignalState {
    armed: bool,
    waiter: Option<Waker>,
}

/// Auto-reset notification gate releasing at most one waiter per `set`.
///
/// The gate supports a single parked waiter at a time. The transfer buffer
/// owns two of them, one per direction, so each gate only ever has the
/// producer or the consumer parked on it.
pub struct AutoResetSignal {
    state: Mutex<SignalState>,
}

impl AutoResetSignal {
    /// Creates an unarmed signal.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SignalState {
                armed: false,
                waiter: None,
            }),
        }
    }

    /// Releases the parked waiter, or arms the gate for the next `wait`.
    pub fn set(&self) {
        let waiter = {
            let mut state = self.state.lock();
            state.armed = true;
            state.waiter.take()
        };
        // Wake outside the lock; the woken task re-enters `poll` immediately on some executors.
        if let Some(waker) = waiter {
            waker.wake();
        }
    }

    /// Returns a future that resolves once the gate is released.
    pub fn wait(&self) -> SignalWait<'_> {
        SignalWait {
            signal: self,
            registered: false,
        }
    }

    /// Consumes a pending release without parking. Returns `true` if one was pending.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        std::mem::replace(&mut state.armed, false)
    }

    /// Whether a release is pending.
    pub fn is_set(&self) -> bool {
        self.state.lock().armed
    }
}

impl Default for AutoResetSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoResetSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AutoResetSignal")
            .field("armed", &state.armed)
            .field("waiting", &state.waiter.is_some())
            .finish()
    }
}

/// Future returned by [`AutoResetSignal::wait`].
#[must_use = "futures do nothing unless polled"]
pub struct SignalWait<'a> {
    signal: &'a AutoResetSignal,
    registered: bool,
}

impl Future for SignalWait<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let signal = this.signal;
        let mut state = signal.state.lock();
        if state.armed {
            state.armed = false;
            state.waiter = None;
            this.registered = false;
            return Poll::Ready(());
        }

        match &mut state.waiter {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            slot => *slot = Some(cx.waker().clone()),
        }
        this.registered = true;
        Poll::Pending
    }
}

impl Drop for SignalWait<'_> {
    fn drop(&mut self) {
        if self.registered {
            // Abandoned by a timeout or cancellation race; forget the stale waker.
            self.signal.state.lock().waiter = None;
        }
    }
}
