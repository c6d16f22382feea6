use serde::{Deserialize, Serialize};
use transfer_buffer::BufferConfig;

/// Producer/consumer load shape driven through a transfer buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Push `items` values back to back while the consumer drains freely.
    Flood { items: u32 },
    /// Push `bursts` groups of `burst_size` values, yielding between groups.
    Burst { bursts: u32, burst_size: u32 },
    /// Push `items` values against a consumer that sleeps between pops.
    Backpressure { items: u32, consumer_delay_ms: u64 },
}

impl ScenarioKind {
    /// Number of values the producer pushes, final value included.
    pub fn total_items(&self) -> u32 {
        match *self {
            ScenarioKind::Flood { items } => items,
            ScenarioKind::Burst { bursts, burst_size } => bursts.saturating_mul(burst_size),
            ScenarioKind::Backpressure { items, .. } => items,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Flood { .. } => "flood",
            ScenarioKind::Burst { .. } => "burst",
            ScenarioKind::Backpressure { .. } => "backpressure",
        }
    }
}

/// Buffer shape plus the load to run through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub buffer: BufferConfig,
    pub kind: ScenarioKind,
}

impl ScenarioConfig {
    pub fn flood(buffer: BufferConfig, items: u32) -> Self {
        Self {
            buffer,
            kind: ScenarioKind::Flood { items },
        }
    }

    pub fn burst(buffer: BufferConfig, bursts: u32, burst_size: u32) -> Self {
        Self {
            buffer,
            kind: ScenarioKind::Burst { bursts, burst_size },
        }
    }

    pub fn backpressure(buffer: BufferConfig, items: u32, consumer_delay_ms: u64) -> Self {
        Self {
            buffer,
            kind: ScenarioKind::Backpressure {
                items,
                consumer_delay_ms,
            },
        }
    }
}
