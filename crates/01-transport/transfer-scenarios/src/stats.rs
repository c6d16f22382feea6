use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ScenarioStats {
    pub produced: u32,
    pub consumed: u32,
    pub push_waits: u32,
    pub pop_waits: u32,
}

impl ScenarioStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub trait StatsSink: Clone + Send + 'static {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R;
}

#[derive(Clone, Default)]
pub struct ArcStatsSink(pub Arc<Mutex<ScenarioStats>>);

impl ArcStatsSink {
    pub fn new(stats: Arc<Mutex<ScenarioStats>>) -> Self {
        Self(stats)
    }

    pub fn snapshot(&self) -> ScenarioStats {
        *self.0.lock()
    }
}

impl StatsSink for ArcStatsSink {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R {
        let mut guard = self.0.lock();
        f(&mut *guard)
    }
}

impl StatsSink for Arc<Mutex<ScenarioStats>> {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }
}
