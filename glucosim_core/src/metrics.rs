//! Metric derivation.
//!
//! Pure, stateless summary statistics over a glucose trajectory. Derived
//! fresh on every call; nothing here mutates the trajectory.

use crate::types::{GlucoseTrajectory, SimulationMetrics};
use crate::{Error, Result};

/// Glucose band considered "in range", in mg/dL
pub const TARGET_RANGE_MG_DL: (f64, f64) = (70.0, 180.0);

/// ADA conversion from average glucose to estimated HbA1c. The constants
/// must be preserved exactly for compatibility with existing displays.
fn estimated_hba1c(average_glucose: f64) -> f64 {
    round2((average_glucose + 46.7) / 28.7)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute summary statistics for a trajectory.
///
/// Fails with `EmptyTrajectory` on zero points (divide-by-zero guard).
pub fn derive_metrics(trajectory: &GlucoseTrajectory) -> Result<SimulationMetrics> {
    if trajectory.is_empty() {
        return Err(Error::EmptyTrajectory);
    }

    let n = trajectory.len() as f64;
    let (low, high) = TARGET_RANGE_MG_DL;

    let mut sum = 0.0;
    let mut in_range = 0usize;
    let mut hypo = 0usize;
    let mut hyper = 0usize;

    for value in trajectory.values() {
        sum += value;
        if value < low {
            hypo += 1;
        } else if value > high {
            hyper += 1;
        } else {
            in_range += 1;
        }
    }

    let average = sum / n;

    Ok(SimulationMetrics {
        average_glucose: average,
        estimated_hba1c: estimated_hba1c(average),
        time_in_range_pct: in_range as f64 / n * 100.0,
        hypoglycemia_pct: hypo as f64 / n * 100.0,
        hyperglycemia_pct: hyper as f64 / n * 100.0,
        fasting_glucose_estimate: round1(average - 10.0),
        post_meal_glucose_estimate: round1(average + 25.0),
    })
}
