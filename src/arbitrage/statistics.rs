//! Running opportunity counters

use crate::types::StatisticsSnapshot;

/// Process-lifetime counters owned by the polling loop. Detection never
/// touches this directly; the loop folds scan and execution results in.
#[derive(Debug, Clone, Default)]
pub struct StatisticsTracker {
    iterations: u64,
    found: u64,
    executed: u64,
    manual_interventions: u64,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn record_found(&mut self, count: usize) {
        self.found += count as u64;
    }

    pub fn record_executed(&mut self) {
        self.executed += 1;
    }

    pub fn record_manual_intervention(&mut self) {
        self.manual_interventions += 1;
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            iterations: self.iterations,
            found: self.found,
            executed: self.executed,
            manual_interventions: self.manual_interventions,
            // 0% rather than a division fault before anything was found
            success_rate_pct: self.executed as f64 / self.found.max(1) as f64 * 100.0,
        }
    }
}
