#![allow(missing_docs)]

mod checks;
mod config;
mod engine;
mod stats;

pub use checks::{verify_backpressure, verify_burst, verify_flood, CheckResult, DrainReport};
pub use config::{ScenarioConfig, ScenarioKind};
pub use engine::{run_scenario, ScenarioEngine, ScenarioError, ScenarioRun};
pub use stats::{ArcStatsSink, ScenarioStats, StatsSink};

/// Utility to update stats counters with wrapping arithmetic.
#[inline]
fn wrapping_add(base: u32, delta: u32) -> u32 {
    base.wrapping_add(delta)
}
