use std::sync::atomic::{AtomicU64, Ordering};

/// Counters recorded by a [`TransferBuffer`](crate::TransferBuffer).
#[derive(Debug, Default)]
pub(crate) struct BufferMetrics {
    pushed: AtomicU64,
    popped: AtomicU64,
    push_waits: AtomicU64,
    pop_waits: AtomicU64,
    timeouts: AtomicU64,
    cancellations: AtomicU64,
    overflows: AtomicU64,
}

/// Events counted by [`BufferMetrics`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BufferEvent {
    Pushed,
    Popped,
    PushWait,
    PopWait,
    TimedOut,
    Cancelled,
    Overflow,
}

impl BufferMetrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, event: BufferEvent) {
        let counter = match event {
            BufferEvent::Pushed => &self.pushed,
            BufferEvent::Popped => &self.popped,
            BufferEvent::PushWait => &self.push_waits,
            BufferEvent::PopWait => &self.pop_waits,
            BufferEvent::TimedOut => &self.timeouts,
            BufferEvent::Cancelled => &self.cancellations,
            BufferEvent::Overflow => &self.overflows,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BufferMetricsSnapshot {
        BufferMetricsSnapshot {
            pushed: self.pushed.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            push_waits: self.push_waits.load(Ordering::Relaxed),
            pop_waits: self.pop_waits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the buffer counters.
///
/// Counters are updated with relaxed ordering; a snapshot taken while both
/// sides are active may be a few events behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferMetricsSnapshot {
    /// Values accepted into the ring.
    pub pushed: u64,
    /// Values handed to the consumer.
    pub popped: u64,
    /// Times a push parked because the ring was full.
    pub push_waits: u64,
    /// Times a pop parked because the ring was empty.
    pub pop_waits: u64,
    /// Waits on either side that hit their ceiling.
    pub timeouts: u64,
    /// Waits on either side ended by cancellation.
    pub cancellations: u64,
    /// Pushes rejected because another push was already parked.
    pub overflows: u64,
}
