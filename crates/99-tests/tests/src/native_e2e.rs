use anyhow::{ensure, Context, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use transfer_buffer::{
    channel, BufferConfig, CancellationToken, FailureCause, PopError, PopOptions, PushError,
};
use transfer_scenarios::{
    run_scenario, verify_backpressure, verify_burst, verify_flood, ArcStatsSink, ScenarioConfig,
    ScenarioStats,
};

use crate::init_tracing;

const CAPACITY: usize = 8;

fn buffer_config() -> BufferConfig {
    BufferConfig::default()
        .with_capacity(CAPACITY)
        .with_default_timeout(Duration::from_secs(10))
}

fn sink() -> (Arc<Mutex<ScenarioStats>>, ArcStatsSink) {
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let sink = ArcStatsSink::new(Arc::clone(&stats));
    (stats, sink)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn native_flood_values() -> Result<()> {
    const ITEMS: u32 = 10_000;
    init_tracing();
    let (stats, sink) = sink();

    let run = run_scenario(ScenarioConfig::flood(buffer_config(), ITEMS), sink).await?;

    let stats = stats.lock();
    verify_flood(&run.report(), &stats, ITEMS).map_err(anyhow::Error::msg)?;
    ensure!(run.metrics.pushed == u64::from(ITEMS), "pushed {}", run.metrics.pushed);
    ensure!(run.metrics.overflows == 0, "unexpected overflow");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn native_burst_fairness() -> Result<()> {
    const BURSTS: u32 = 40;
    const BURST_SIZE: u32 = 64;
    init_tracing();
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));

    // The shared stats handle is itself a sink.
    let run = run_scenario(
        ScenarioConfig::burst(buffer_config(), BURSTS, BURST_SIZE),
        Arc::clone(&stats),
    )
    .await?;

    let stats = stats.lock();
    verify_burst(&run.report(), &stats, BURSTS * BURST_SIZE, CAPACITY)
        .map_err(anyhow::Error::msg)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn native_backpressure_recovery() -> Result<()> {
    const ITEMS: u32 = 64;
    init_tracing();
    let (stats, sink) = sink();

    let run = run_scenario(
        ScenarioConfig::backpressure(buffer_config(), ITEMS, 2),
        sink,
    )
    .await?;

    let stats = stats.lock();
    verify_backpressure(&run.report(), &stats, ITEMS, CAPACITY).map_err(anyhow::Error::msg)?;
    ensure!(run.max_depth <= CAPACITY, "depth {}", run.max_depth);
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("upstream closed after {rows} rows")]
struct UpstreamClosed {
    rows: u32,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn producer_failure_ends_stream() -> Result<()> {
    init_tracing();
    let (mut producer, mut consumer) = channel::<u32>(buffer_config())?;

    let writer = tokio::spawn(async move {
        for value in 0..5 {
            producer.push(value).await?;
        }
        let cause: FailureCause = Arc::new(UpstreamClosed { rows: 5 });
        producer.fail("upstream read failed", Some(cause));
        Ok::<_, PushError>(())
    });

    let mut received = Vec::new();
    let failure = loop {
        match consumer.pop().await {
            Ok(outcome) => {
                if let Some(value) = outcome.into_value() {
                    received.push(value);
                }
            }
            Err(PopError::Failed(failure)) => break failure,
            Err(other) => return Err(other).context("unexpected pop error"),
        }
    };
    writer.await??;

    // Values still queued at fail time are superseded by the failure.
    ensure!(received.len() <= 5, "received {:?}", received);
    ensure!(failure.message() == "upstream read failed");
    let cause = failure
        .downcast_cause::<UpstreamClosed>()
        .context("cause type preserved")?;
    ensure!(cause.rows == 5);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn consumer_cancellation_from_another_task() -> Result<()> {
    init_tracing();
    let (_producer, mut consumer) = channel::<u32>(buffer_config())?;
    let token = CancellationToken::new();
    let canceller = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let outcome = consumer.pop_with(PopOptions::new().cancel_on(&token)).await?;
    ensure!(outcome.is_cancelled(), "got {:?}", outcome);
    ensure!(consumer.buffer().metrics().cancellations == 1);
    Ok(())
}

// Long-running stream through a single-slot buffer.
// Must be marked #[ignore] and prefixed with "slow_"
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn slow_single_slot_million_values() -> Result<()> {
    const ITEMS: u32 = 1_000_000;
    init_tracing();
    let (stats, sink) = sink();
    let config = BufferConfig::default().with_capacity(1);

    let run = run_scenario(ScenarioConfig::flood(config, ITEMS), sink).await?;

    let stats = stats.lock();
    verify_flood(&run.report(), &stats, ITEMS).map_err(anyhow::Error::msg)?;
    Ok(())
}
