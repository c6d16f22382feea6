//! Error surface for the transfer buffer.
//!
//! The four control conditions (finished, overflow, cancelled, timed out)
//! are distinct variants so callers can branch on them. Anything else that
//! goes wrong inside a push or pop is wrapped in [`InternalError`] with the
//! original fault attached as its source.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Boxed cause carried by a producer-declared failure.
pub type FailureCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Convenience result alias for buffer construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected buffer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("buffer capacity must be at least 1 slot (requested {requested})")]
    InvalidCapacity { requested: usize },

    #[error("default timeout must be at least 1 ms (requested {requested_ms} ms)")]
    InvalidTimeout { requested_ms: u64 },
}

/// Failure raised by `push`.
#[derive(Debug, Error)]
pub enum PushError {
    /// A value marked final was already pushed.
    #[error("push attempted after the buffer was marked finished")]
    Finished,

    /// The buffer is full and another push is already parked waiting for space.
    #[error("buffer is at capacity and another push is already waiting for space")]
    Overflow,

    /// Cancellation was requested while waiting for space.
    #[error("push was cancelled while waiting for space")]
    Cancelled,

    /// No slot was freed within the wait ceiling.
    #[error("push timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),

    /// Unexpected fault inside the push path.
    #[error("push failed: {0}")]
    Internal(#[source] InternalError),
}

impl PushError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PushError::TimedOut(_))
    }
}

/// Failure raised by `pop`.
///
/// Cancellation and completion are not errors; they come back as
/// [`TransferOutcome`](crate::TransferOutcome) values.
#[derive(Debug, Error)]
pub enum PopError {
    /// No value was published within the wait ceiling.
    #[error("pop timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),

    /// The producer called `fail`; the stored failure is re-raised.
    #[error(transparent)]
    Failed(BufferFailure),

    /// Unexpected fault inside the pop path.
    #[error("pop failed: {0}")]
    Internal(#[source] InternalError),
}

impl PopError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PopError::TimedOut(_))
    }

    /// The producer failure, if this error carries one.
    pub fn failure(&self) -> Option<&BufferFailure> {
        match self {
            PopError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Sticky failure declared by the producer through `fail`.
///
/// Cloned into every pop that observes it; `source()` yields the cause the
/// producer supplied (or a [`ProducerFailure`] carrying the message when it
/// supplied none).
#[derive(Clone)]
pub struct BufferFailure {
    message: String,
    cause: FailureCause,
}

impl BufferFailure {
    pub(crate) fn new(message: String, cause: Option<FailureCause>) -> Self {
        let cause = cause.unwrap_or_else(|| Arc::new(ProducerFailure(message.clone())));
        Self { message, cause }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.cause
    }

    /// Attempts to view the cause as a concrete error type.
    pub fn downcast_cause<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }
}

impl fmt::Debug for BufferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferFailure")
            .field("message", &self.message)
            .field("cause", &self.cause)
            .finish()
    }
}

impl fmt::Display for BufferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "producer failed: {}", self.message)
    }
}

impl StdError for BufferFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// Stand-in cause for a failure declared without one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProducerFailure(pub String);

/// Generic wrapper for faults that are not one of the named conditions.
#[derive(Debug, Error)]
#[error("{context}")]
pub struct InternalError {
    context: &'static str,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl InternalError {
    pub(crate) fn new(
        context: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            context,
            source: source.into(),
        }
    }

    pub fn context(&self) -> &'static str {
        self.context
    }
}

/// Slot checks made on every ring write and read.
///
/// Writes only happen under the ring lock once the ring is not full, and
/// reads only once it is not empty, so neither variant is expected in
/// practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingFault {
    #[error("slot {index} still holds an unconsumed value at the push cursor")]
    SlotOccupied { index: usize },

    #[error("slot {index} is vacant at the pop cursor")]
    SlotVacant { index: usize },
}
