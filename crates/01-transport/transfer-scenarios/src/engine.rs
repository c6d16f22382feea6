use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use transfer_buffer::{
    channel, BufferMetricsSnapshot, ConfigError, Consumer, PopError, Producer, PushError,
    TransferOutcome,
};

use crate::checks::DrainReport;
use crate::config::{ScenarioConfig, ScenarioKind};
use crate::stats::StatsSink;
use crate::wrapping_add;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario pushes no values")]
    Empty,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("producer push failed: {0}")]
    Push(#[from] PushError),
    #[error("consumer pop failed: {0}")]
    Pop(#[from] PopError),
    #[error("consumer was cancelled before completion")]
    Cancelled,
    #[error("producer task aborted: {0}")]
    ProducerTask(#[from] tokio::task::JoinError),
}

/// Everything the consumer drained during one scenario run.
#[derive(Clone, Debug)]
pub struct ScenarioRun {
    pub values: Vec<u32>,
    pub max_depth: usize,
    pub metrics: BufferMetricsSnapshot,
}

impl ScenarioRun {
    pub fn report(&self) -> DrainReport<'_> {
        DrainReport {
            values: &self.values,
            max_depth: Some(self.max_depth),
        }
    }
}

/// Producer half of a scenario: pushes `0..total` with the last value final.
pub struct ScenarioEngine<S> {
    producer: Producer<u32>,
    stats: S,
    kind: ScenarioKind,
}

impl<S> ScenarioEngine<S>
where
    S: StatsSink,
{
    pub fn new(producer: Producer<u32>, stats: S, kind: ScenarioKind) -> Self {
        Self {
            producer,
            stats,
            kind,
        }
    }

    async fn produce(&mut self, value: u32, is_final: bool) -> Result<(), PushError> {
        if is_final {
            self.producer.push_final(value).await?;
        } else {
            self.producer.push(value).await?;
        }
        self.stats
            .with_stats(|stats| stats.produced = wrapping_add(stats.produced, 1));
        Ok(())
    }

    /// Runs the producer side to completion.
    pub async fn run(mut self) -> Result<(), PushError> {
        let total = self.kind.total_items();
        match self.kind {
            ScenarioKind::Flood { .. } | ScenarioKind::Backpressure { .. } => {
                for value in 0..total {
                    self.produce(value, value + 1 == total).await?;
                }
            }
            ScenarioKind::Burst { bursts, burst_size } => {
                let mut value = 0u32;
                for burst in 0..bursts {
                    for _ in 0..burst_size {
                        self.produce(value, value + 1 == total).await?;
                        value += 1;
                    }
                    debug!(burst, "burst pushed");
                    tokio::task::yield_now().await;
                }
            }
        }
        Ok(())
    }
}

async fn drain<S: StatsSink>(
    consumer: &mut Consumer<u32>,
    stats: &S,
    delay: Option<Duration>,
    expected: u32,
) -> Result<(Vec<u32>, usize), ScenarioError> {
    let mut values = Vec::with_capacity(expected as usize);
    let mut max_depth = 0usize;
    loop {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        max_depth = max_depth.max(consumer.buffer().len());
        match consumer.pop().await? {
            TransferOutcome::Value { value, complete } => {
                values.push(value);
                stats.with_stats(|stats| stats.consumed = wrapping_add(stats.consumed, 1));
                if complete {
                    break;
                }
            }
            TransferOutcome::Complete => break,
            TransferOutcome::Cancelled => return Err(ScenarioError::Cancelled),
        }
    }
    Ok((values, max_depth))
}

/// Spawns the producer on the current tokio runtime and drains on the caller.
pub async fn run_scenario<S>(config: ScenarioConfig, stats: S) -> Result<ScenarioRun, ScenarioError>
where
    S: StatsSink,
{
    let expected = config.kind.total_items();
    if expected == 0 {
        return Err(ScenarioError::Empty);
    }

    let (producer, mut consumer) = channel::<u32>(config.buffer)?;
    info!(
        scenario = config.kind.name(),
        capacity = config.buffer.capacity,
        items = expected,
        "scenario starting"
    );

    let engine = ScenarioEngine::new(producer, stats.clone(), config.kind);
    let writer = tokio::spawn(engine.run());

    let delay = match config.kind {
        ScenarioKind::Backpressure {
            consumer_delay_ms, ..
        } => Some(Duration::from_millis(consumer_delay_ms)),
        _ => None,
    };

    let drained = drain(&mut consumer, &stats, delay, expected).await;
    if drained.is_err() {
        writer.abort();
    }
    let (values, max_depth) = drained?;
    writer.await??;

    let metrics = consumer.buffer().metrics();
    stats.with_stats(|stats| {
        stats.push_waits = wrapping_add(stats.push_waits, saturate(metrics.push_waits));
        stats.pop_waits = wrapping_add(stats.pop_waits, saturate(metrics.pop_waits));
    });
    info!(
        scenario = config.kind.name(),
        drained = values.len(),
        push_waits = metrics.push_waits,
        pop_waits = metrics.pop_waits,
        "scenario finished"
    );

    Ok(ScenarioRun {
        values,
        max_depth,
        metrics,
    })
}

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
