//! Scan statistics types

use serde::Serialize;

/// Point-in-time view of the running counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub iterations: u64,
    pub found: u64,
    pub executed: u64,
    pub manual_interventions: u64,
    pub success_rate_pct: f64,
}
