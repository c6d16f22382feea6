//! Buffer configuration and per-call options.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigError, ConfigResult};

/// Slot count used when none is configured.
pub const DEFAULT_CAPACITY: usize = 2;
/// Wait ceiling used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Shape of a transfer buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of slots in the ring.
    pub capacity: usize,
    /// Wait ceiling applied to push/pop calls that do not override it.
    pub default_timeout_ms: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl BufferConfig {
    pub fn new(capacity: usize, default_timeout: Duration) -> Self {
        Self::default()
            .with_capacity(capacity)
            .with_default_timeout(default_timeout)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sub-millisecond precision is truncated.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                requested: self.capacity,
            });
        }
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout {
                requested_ms: self.default_timeout_ms,
            });
        }
        Ok(())
    }
}

/// Per-call overrides for `push_with`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PushOptions<'a> {
    /// Marks the pushed value as the last one.
    pub is_final: bool,
    /// Aborts the wait for space when cancelled.
    pub cancel: Option<&'a CancellationToken>,
    /// Overrides the buffer's default wait ceiling.
    pub timeout: Option<Duration>,
}

impl<'a> PushOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn final_value(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn cancel_on(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Per-call overrides for `pop_with`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PopOptions<'a> {
    /// Ends the wait for data with [`TransferOutcome::Cancelled`](crate::TransferOutcome::Cancelled).
    pub cancel: Option<&'a CancellationToken>,
    /// Overrides the buffer's default wait ceiling.
    pub timeout: Option<Duration>,
}

impl<'a> PopOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_on(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = BufferConfig::default();
        assert_eq!(config.capacity, 2);
        assert_eq!(config.default_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = BufferConfig::default().with_capacity(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCapacity { requested: 0 })
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = BufferConfig::new(4, Duration::from_micros(300));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTimeout { requested_ms: 0 })
        );
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: BufferConfig = serde_json::from_str(r#"{ "capacity": 16 }"#).expect("parse");
        assert_eq!(config.capacity, 16);
        assert_eq!(config.default_timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn options_builders_compose() {
        let token = CancellationToken::new();
        let push = PushOptions::new()
            .final_value()
            .cancel_on(&token)
            .timeout(Duration::from_millis(10));
        assert!(push.is_final);
        assert!(push.cancel.is_some());
        assert_eq!(push.timeout, Some(Duration::from_millis(10)));

        let pop = PopOptions::new().timeout(Duration::from_millis(20));
        assert!(pop.cancel.is_none());
        assert_eq!(pop.timeout, Some(Duration::from_millis(20)));
    }
}
