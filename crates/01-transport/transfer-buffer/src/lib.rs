//! Bounded asynchronous hand-off between one producer and one consumer.
//!
//! The crate exposes:
//! * [`TransferBuffer`] – fixed-capacity ring with backpressure, timeouts,
//!   cancellation, a final-value marker and producer-to-consumer failure
//!   propagation.
//! * [`AutoResetSignal`] – the single-slot async wake-up gate both directions park on.
//! * [`channel`] / [`Producer`] / [`Consumer`] – split handles over one buffer.
//! * [`PushError`] / [`PopError`] – narrowly typed failures; cancellation and
//!   completion on the consumer side are [`TransferOutcome`] values instead.

mod buffer;
mod config;
mod error;
mod handle;
mod metrics;
mod outcome;
mod ring;
pub mod signal;
mod sync;
pub mod wait;

pub use buffer::TransferBuffer;
pub use config::{BufferConfig, PopOptions, PushOptions, DEFAULT_CAPACITY, DEFAULT_TIMEOUT_MS};
pub use error::{
    BufferFailure, ConfigError, ConfigResult, FailureCause, InternalError, PopError,
    ProducerFailure, PushError, RingFault,
};
pub use handle::{channel, Consumer, Producer};
pub use metrics::BufferMetricsSnapshot;
pub use outcome::TransferOutcome;
pub use signal::{AutoResetSignal, SignalWait};
pub use wait::{deadline_after, wait_signal, WaitResult};

/// Cancellation token accepted by [`PushOptions`] and [`PopOptions`].
pub use tokio_util::sync::CancellationToken;
