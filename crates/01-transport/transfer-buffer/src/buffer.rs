//! Bounded single-producer/single-consumer transfer buffer.
//!
//! The producer calls [`TransferBuffer::push`], the consumer calls
//! [`TransferBuffer::pop`], and the two never need to know about each other:
//!
//! ```text
//! push(v) ──► ring[push_cursor] ──► value_published.set() ──► pop() wakes
//! pop()   ──► ring[pop_cursor]  ──► slot_freed.set()      ──► push() wakes
//! ```
//!
//! The ring and every state flag live behind one lock that is held only for
//! the cursor/slot update and flag checks, never across a wait. Waiting is
//! done on the two auto-reset signals, raced against the call's deadline and
//! the caller's cancellation token.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::config::{BufferConfig, PopOptions, PushOptions};
use crate::error::{
    BufferFailure, ConfigResult, FailureCause, InternalError, PopError, PushError, RingFault,
};
use crate::metrics::{BufferEvent, BufferMetrics, BufferMetricsSnapshot};
use crate::outcome::TransferOutcome;
use crate::ring::Ring;
use crate::signal::AutoResetSignal;
use crate::wait::{deadline_after, wait_signal, WaitResult};

/// Capacity-limited hand-off between one producer and one consumer.
///
/// Share it with `Arc` or split it with [`channel`](crate::channel). At most
/// one push may be parked waiting for space at a time; a second one is
/// rejected with [`PushError::Overflow`]. Only one consumer may pop at a
/// time; that is a usage contract and is not checked.
pub struct TransferBuffer<T> {
    ring: Mutex<Ring<T>>,
    slot_freed: AutoResetSignal,
    value_published: AutoResetSignal,
    default_timeout: Duration,
    metrics: BufferMetrics,
}

impl<T> TransferBuffer<T> {
    /// Creates a buffer with `capacity` slots and a default wait ceiling.
    pub fn new(capacity: usize, default_timeout: Duration) -> ConfigResult<Self> {
        Self::with_config(BufferConfig::new(capacity, default_timeout))
    }

    pub fn with_config(config: BufferConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            ring: Mutex::new(Ring::new(config.capacity)),
            slot_freed: AutoResetSignal::new(),
            value_published: AutoResetSignal::new(),
            default_timeout: config.default_timeout(),
            metrics: BufferMetrics::new(),
        })
    }

    /// Pushes a value, waiting up to the default timeout for space.
    pub async fn push(&self, value: T) -> Result<(), PushError> {
        self.push_with(value, PushOptions::new()).await
    }

    /// Pushes the last value; once it is drained the consumer sees completion.
    pub async fn push_final(&self, value: T) -> Result<(), PushError> {
        self.push_with(value, PushOptions::new().final_value()).await
    }

    /// Pushes a value with per-call overrides.
    ///
    /// Fails with [`PushError::Finished`] once a final value was pushed (or the
    /// buffer was failed), with [`PushError::Overflow`] if the ring is full and
    /// another push is already parked, and with [`PushError::Cancelled`] or
    /// [`PushError::TimedOut`] if the wait for space ends that way.
    pub async fn push_with(&self, value: T, options: PushOptions<'_>) -> Result<(), PushError> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let deadline = deadline_after(timeout);

        loop {
            {
                let mut ring = self.ring.lock();
                if ring.finished {
                    return Err(PushError::Finished);
                }

                if !ring.is_full() {
                    let index = ring
                        .write(value, options.is_final)
                        .map_err(|fault| PushError::Internal(internal("ring write", fault)))?;
                    trace!(
                        index,
                        next = ring.push_cursor(),
                        len = ring.len(),
                        is_final = options.is_final,
                        "value published"
                    );
                    drop(ring);

                    self.metrics.record(BufferEvent::Pushed);
                    self.value_published.set();
                    return Ok(());
                }

                if ring.waiting_pusher {
                    drop(ring);
                    self.metrics.record(BufferEvent::Overflow);
                    warn!("push rejected: buffer full and another push is already waiting");
                    return Err(PushError::Overflow);
                }

                ring.waiting_pusher = true;
                // Releases issued before this observation belong to slots that are already refilled.
                self.slot_freed.try_acquire();
            }

            let parked = ParkedPusher { ring: &self.ring };
            self.metrics.record(BufferEvent::PushWait);
            debug!(timeout_ms = timeout.as_millis() as u64, "push parked: buffer full");
            let result = wait_signal(&self.slot_freed, deadline, options.cancel).await;
            drop(parked);

            match result {
                WaitResult::Signalled => continue,
                WaitResult::Cancelled => {
                    self.metrics.record(BufferEvent::Cancelled);
                    debug!("push cancelled while waiting for space");
                    return Err(PushError::Cancelled);
                }
                WaitResult::TimedOut => {
                    self.metrics.record(BufferEvent::TimedOut);
                    warn!(timeout_ms = timeout.as_millis() as u64, "push timed out");
                    return Err(PushError::TimedOut(timeout));
                }
            }
        }
    }

    /// Pops the next value, waiting up to the default timeout for one.
    pub async fn pop(&self) -> Result<TransferOutcome<T>, PopError> {
        self.pop_with(PopOptions::new()).await
    }

    /// Pops the next value with per-call overrides.
    ///
    /// Cancellation and completion come back as [`TransferOutcome`] values. A
    /// producer failure is re-raised on every call, including calls that were
    /// already parked and calls that find a value still queued.
    pub async fn pop_with(&self, options: PopOptions<'_>) -> Result<TransferOutcome<T>, PopError> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let deadline = deadline_after(timeout);

        loop {
            {
                let mut ring = self.ring.lock();
                if let Some(failure) = &ring.failure {
                    return Err(PopError::Failed(failure.clone()));
                }

                if !ring.is_empty() {
                    let value = ring
                        .read()
                        .map_err(|fault| PopError::Internal(internal("ring read", fault)))?;
                    let complete = ring.finished && ring.is_empty();
                    trace!(
                        index = ring.pop_cursor(),
                        len = ring.len(),
                        complete,
                        "value consumed"
                    );
                    drop(ring);

                    self.metrics.record(BufferEvent::Popped);
                    self.slot_freed.set();
                    return Ok(TransferOutcome::Value { value, complete });
                }

                if ring.finished {
                    return Ok(TransferOutcome::Complete);
                }

                self.value_published.try_acquire();
            }

            self.metrics.record(BufferEvent::PopWait);
            debug!(timeout_ms = timeout.as_millis() as u64, "pop parked: buffer empty");

            match wait_signal(&self.value_published, deadline, options.cancel).await {
                WaitResult::Signalled => continue,
                WaitResult::Cancelled => {
                    self.metrics.record(BufferEvent::Cancelled);
                    debug!("pop cancelled while waiting for data");
                    return Ok(TransferOutcome::Cancelled);
                }
                WaitResult::TimedOut => {
                    self.metrics.record(BufferEvent::TimedOut);
                    warn!(timeout_ms = timeout.as_millis() as u64, "pop timed out");
                    return Err(PopError::TimedOut(timeout));
                }
            }
        }
    }

    /// Marks the buffer failed and finished.
    ///
    /// Every later pop, and any pop already parked, fails with
    /// [`PopError::Failed`]. A push parked for space wakes and fails with
    /// [`PushError::Finished`]. When `cause` is `None` the message itself
    /// becomes the cause. Calling it again replaces the stored failure.
    pub fn fail(&self, message: impl Into<String>, cause: Option<FailureCause>) {
        let failure = BufferFailure::new(message.into(), cause);
        error!(message = failure.message(), cause = %failure.cause(), "transfer buffer failed");
        {
            let mut ring = self.ring.lock();
            ring.failure = Some(failure);
            ring.finished = true;
        }
        self.value_published.set();
        self.slot_freed.set();
    }

    /// [`fail`](Self::fail) with a concrete error as the cause.
    pub fn fail_with<E>(&self, message: impl Into<String>, cause: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        self.fail(message, Some(Arc::new(cause)));
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Number of values pushed but not yet popped.
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    /// True once a final value was pushed or the buffer failed.
    pub fn is_finished(&self) -> bool {
        self.ring.lock().finished
    }

    pub fn is_failed(&self) -> bool {
        self.ring.lock().failure.is_some()
    }

    pub fn failure_message(&self) -> Option<String> {
        self.ring
            .lock()
            .failure
            .as_ref()
            .map(|failure| failure.message().to_owned())
    }

    pub fn failure(&self) -> Option<BufferFailure> {
        self.ring.lock().failure.clone()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn metrics(&self) -> BufferMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T> fmt::Debug for TransferBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("TransferBuffer")
            .field("capacity", &ring.capacity())
            .field("len", &ring.len())
            .field("finished", &ring.finished)
            .field("failed", &ring.failure.is_some())
            .field("waiting_pusher", &ring.waiting_pusher)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Clears the parked-pusher flag when the wait ends, including when the push
/// future is dropped mid-wait.
struct ParkedPusher<'a, T> {
    ring: &'a Mutex<Ring<T>>,
}

impl<T> Drop for ParkedPusher<'_, T> {
    fn drop(&mut self) {
        self.ring.lock().waiting_pusher = false;
    }
}

fn internal(context: &'static str, fault: RingFault) -> InternalError {
    error!(%fault, context, "transfer buffer invariant violated");
    InternalError::new(context, fault)
}
