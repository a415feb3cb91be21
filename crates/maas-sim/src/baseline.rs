//! Mock metrics for the private-vehicle baseline.

use maas_core::SimRng;

use crate::engine::{round_to, SimulationMetrics};

pub const BASELINE_SCENARIO: &str = "Baseline (Privately Owned Vehicles)";

/// Plausible private-vehicle metrics; no model is run.
///
/// Conflict density ~ U(80, 100), travel time ~ U(45, 60) minutes, fleet
/// utilisation ~ U(2, 5) percent.
pub fn baseline_metrics(rng: &mut SimRng) -> SimulationMetrics {
    SimulationMetrics {
        conflict_density:      round_to(rng.gen_range(80.0..=100.0), 2),
        avg_travel_time_mins:  round_to(rng.gen_range(45.0..=60.0), 1),
        fleet_utilization_pct: round_to(rng.gen_range(2.0..=5.0), 1),
    }
}
