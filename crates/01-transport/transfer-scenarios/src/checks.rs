use crate::stats::ScenarioStats;

/// Borrowed view over drained values for verification helpers.
pub struct DrainReport<'a> {
    pub values: &'a [u32],
    pub max_depth: Option<usize>,
}

pub type CheckResult = Result<(), String>;

pub fn verify_flood(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_items: u32,
) -> CheckResult {
    if drain.values.len() as u32 != expected_items {
        return Err(format!(
            "drained {} values (expected {})",
            drain.values.len(),
            expected_items
        ));
    }
    if let Some(position) = drain
        .values
        .iter()
        .zip(0u32..)
        .position(|(value, expected)| *value != expected)
    {
        return Err(format!(
            "value {} drained at position {} (expected {})",
            drain.values[position], position, position
        ));
    }
    if stats.produced != expected_items {
        return Err(format!(
            "stats produced {} values (expected {})",
            stats.produced, expected_items
        ));
    }
    if stats.consumed != expected_items {
        return Err(format!(
            "stats consumed {} values (expected {})",
            stats.consumed, expected_items
        ));
    }
    Ok(())
}

pub fn verify_burst(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_items: u32,
    capacity: usize,
) -> CheckResult {
    verify_flood(drain, stats, expected_items)?;
    if let Some(depth) = drain.max_depth {
        if depth > capacity {
            return Err(format!(
                "buffer depth {} exceeded capacity {}",
                depth, capacity
            ));
        }
    }
    Ok(())
}

pub fn verify_backpressure(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_items: u32,
    capacity: usize,
) -> CheckResult {
    verify_burst(drain, stats, expected_items, capacity)?;
    if stats.push_waits == 0 {
        return Err("backpressure scenario expected the producer to park, it never did".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(count: u32) -> ScenarioStats {
        ScenarioStats {
            produced: count,
            consumed: count,
            ..ScenarioStats::default()
        }
    }

    #[test]
    fn flood_accepts_ordered_drain() {
        let values: Vec<u32> = (0..5).collect();
        let drain = DrainReport {
            values: &values,
            max_depth: Some(2),
        };
        assert_eq!(verify_flood(&drain, &stats(5), 5), Ok(()));
    }

    #[test]
    fn flood_reports_reordering() {
        let values = [0, 2, 1];
        let drain = DrainReport {
            values: &values,
            max_depth: None,
        };
        let err = verify_flood(&drain, &stats(3), 3).expect_err("reordered");
        assert!(err.contains("position 1"), "{err}");
    }

    #[test]
    fn burst_rejects_depth_over_capacity() {
        let values: Vec<u32> = (0..4).collect();
        let drain = DrainReport {
            values: &values,
            max_depth: Some(5),
        };
        assert!(verify_burst(&drain, &stats(4), 4, 4).is_err());
    }

    #[test]
    fn backpressure_requires_a_parked_producer() {
        let values: Vec<u32> = (0..4).collect();
        let drain = DrainReport {
            values: &values,
            max_depth: Some(2),
        };
        assert!(verify_backpressure(&drain, &stats(4), 4, 2).is_err());

        let parked = ScenarioStats {
            push_waits: 3,
            ..stats(4)
        };
        assert_eq!(verify_backpressure(&drain, &parked, 4, 2), Ok(()));
    }
}
