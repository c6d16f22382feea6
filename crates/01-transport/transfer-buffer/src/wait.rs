//! Bounded waits on an [`AutoResetSignal`].
//!
//! A parked push or pop races three events: the signal it is waiting on, the
//! caller's cancellation token, and the call's deadline. Whichever is ready
//! first decides the result; the signal is polled first so data that already
//! arrived is never discarded in favour of a cancellation or timeout that
//! fired at the same instant.
//!
//! The deadline is fixed once per push or pop call, so waking and parking
//! again inside one call never extends its wait ceiling.

use std::future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::signal::AutoResetSignal;

/// Result of a bounded wait on a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitResult {
    /// The signal was released.
    Signalled,
    /// The cancellation token fired first.
    Cancelled,
    /// The deadline passed first.
    TimedOut,
}

/// Roughly thirty years; stands in for a ceiling too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline `timeout` from now, clamped when the sum overflows.
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Parks until `signal` is released, `cancel` fires, or `deadline` passes.
///
/// `None` for `cancel` means the wait can only end by signal or timer.
pub async fn wait_signal(
    signal: &AutoResetSignal,
    deadline: Instant,
    cancel: Option<&CancellationToken>,
) -> WaitResult {
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = signal.wait() => WaitResult::Signalled,
        _ = cancelled => WaitResult::Cancelled,
        _ = tokio::time::sleep_until(deadline) => WaitResult::TimedOut,
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn times_out_without_signal() {
        let signal = AutoResetSignal::new();
        let result = wait_signal(&signal, deadline_after(Duration::from_millis(100)), None).await;
        assert_eq!(result, WaitResult::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_signal_wins_over_fired_cancel() {
        let signal = AutoResetSignal::new();
        let token = CancellationToken::new();
        signal.set();
        token.cancel();
        let result = wait_signal(
            &signal,
            deadline_after(Duration::from_millis(100)),
            Some(&token),
        )
        .await;
        assert_eq!(result, WaitResult::Signalled);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_ends_wait() {
        let signal = AutoResetSignal::new();
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let result = wait_signal(
            &signal,
            deadline_after(Duration::from_secs(60)),
            Some(&token),
        )
        .await;
        assert_eq!(result, WaitResult::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_set_during_wait_releases_it() {
        let signal = std::sync::Arc::new(AutoResetSignal::new());
        let setter = std::sync::Arc::clone(&signal);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            setter.set();
        });
        let result = wait_signal(&signal, deadline_after(Duration::from_secs(60)), None).await;
        assert_eq!(result, WaitResult::Signalled);
        assert!(!signal.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_absolute() {
        let signal = AutoResetSignal::new();
        let start = Instant::now();
        let deadline = deadline_after(Duration::from_millis(100));
        tokio::time::advance(Duration::from_millis(60)).await;

        let result = wait_signal(&signal, deadline, None).await;
        assert_eq!(result, WaitResult::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn oversized_timeout_is_clamped() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            let deadline = deadline_after(Duration::MAX);
            assert!(deadline > Instant::now() + Duration::from_secs(86_400));
        });
    }
}
