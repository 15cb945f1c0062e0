//! Daily glucose trajectory generator.
//!
//! Combines the diagnosis-dependent baseline with every resolver output
//! into a single adjusted glucose level, then expands it into a sampled
//! trajectory with uniform jitter. Each invocation is a complete, pure
//! computation over its own parameter set; the engine holds no state
//! across calls.

use crate::catalog::MedicationCatalog;
use crate::metrics::derive_metrics;
use crate::resolvers;
use crate::types::{GlucoseTrajectory, ParameterSet, SimulationMetrics, TrajectoryPoint};
use crate::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of daily samples (one week)
pub const DEFAULT_SAMPLE_COUNT: usize = 7;
/// Half-width of the uniform jitter applied to each daily sample, mg/dL
pub const DAILY_JITTER_MG_DL: f64 = 10.0;
/// Scaling of the summed medication effect into mg/dL
pub const MEDICATION_EFFECT_SCALE: f64 = 15.0;

const MINUTES_PER_DAY: i64 = 1440;

/// Deterministic RNG when a seed is supplied, entropy-seeded otherwise
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Compute the adjusted glucose level for a parameter set, before jitter.
///
/// The parameter set must already be normalized; resolver range checks act
/// as a second line of defence.
pub fn compute_adjusted_glucose(catalog: &MedicationCatalog, params: &ParameterSet) -> Result<f64> {
    let mut baseline = params.diagnosis.baseline_glucose();
    baseline += resolvers::secondary_medication_offset(catalog, &params.medications)?;
    baseline += resolvers::hormonal_offset(&params.hormonal);
    baseline += resolvers::sleep_offset(params.lifestyle.sleep_hours)?;

    let med_effect =
        resolvers::medication_effect(catalog, params.diagnosis, &params.medications)?;

    let mut adjusted = baseline - MEDICATION_EFFECT_SCALE * med_effect
        + resolvers::exercise_offset(params.lifestyle.exercise_minutes)?
        + resolvers::weight_offset(params.demographics.weight_lbs())?;

    adjusted *= resolvers::diet_factor(resolvers::diet_score(&params.lifestyle.diet));

    // Insulin correction. Only rapid/short-acting insulin yield an ISF;
    // intermediate/long-acting report "not applicable" via isf() == None.
    if let Some(insulin) = &params.insulin {
        if let Some(isf) = insulin.isf() {
            let correction_dose =
                ((insulin.current_reading - insulin.target_reading) / isf).max(0.0);
            adjusted -= correction_dose * isf;
        } else {
            tracing::debug!(
                "No ISF for {:?} insulin; correction not applicable",
                insulin.insulin_type
            );
        }
    }

    // Deliberately unclamped: physiological clamping is a presentation
    // decision, not an engine one.
    Ok(adjusted)
}

/// Run the daily simulation: one glucose sample per day plus uniform
/// jitter, and the derived summary metrics.
///
/// Supplying the same parameter set and seed reproduces the identical
/// point sequence.
pub fn run_daily_simulation(
    catalog: &MedicationCatalog,
    params: &ParameterSet,
    sample_count: usize,
    seed: Option<u64>,
) -> Result<(GlucoseTrajectory, SimulationMetrics)> {
    let params = params.normalized(catalog)?;
    let adjusted = compute_adjusted_glucose(catalog, &params)?;

    tracing::info!(
        adjusted_glucose = adjusted,
        sample_count,
        "Running daily simulation"
    );

    let mut rng = make_rng(seed);
    let points = (0..sample_count)
        .map(|day| TrajectoryPoint {
            offset_minutes: day as i64 * MINUTES_PER_DAY,
            glucose_mg_dl: adjusted
                + rng.gen_range(-DAILY_JITTER_MG_DL..=DAILY_JITTER_MG_DL),
        })
        .collect();

    let trajectory = GlucoseTrajectory {
        start: Utc::now(),
        points,
    };
    let metrics = derive_metrics(&trajectory)?;
    Ok((trajectory, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::types::{
        ActivityLevel, Demographics, Diagnosis, DietInputs, Hormonal, InsulinContext, InsulinType,
        Lifestyle, MedicationDose, Sex, KG_PER_LB,
    };
    use crate::Error;

    fn params(diagnosis: Diagnosis) -> ParameterSet {
        ParameterSet {
            demographics: Demographics {
                age: 45,
                weight_kg: 150.0 * KG_PER_LB,
                sex: Sex::Other,
                activity_level: ActivityLevel::Sedentary,
            },
            diagnosis,
            medications: vec![],
            lifestyle: Lifestyle {
                exercise_minutes: 0,
                sleep_hours: 7.0,
                diet: DietInputs::default(),
            },
            hormonal: Hormonal::default(),
            insulin: None,
        }
    }

    #[test]
    fn test_baseline_identity_for_clean_non_diabetic() {
        // No medications, no penalties: only weight/exercise/diet terms apply
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::NonDiabetic);
        p.lifestyle.exercise_minutes = 20;

        let adjusted = compute_adjusted_glucose(&catalog, &p).unwrap();
        let expected = (110.0 - 0.2 * 20.0 + 0.05 * 150.0)
            * resolvers::diet_factor(resolvers::diet_score(&p.lifestyle.diet));
        assert!((adjusted - expected).abs() < 1e-9);
    }

    #[test]
    fn test_worked_diabetic_scenario() {
        // Diabetic, metformin (eff 0.5) 1000 mg, 30 min exercise, 150 lbs,
        // diet score 0: adjusted = 160 - 7.5 - 6 + 7.5 = 154.0
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::Diabetic);
        p.medications.push(MedicationDose {
            drug_id: "metformin".into(),
            dose_mg: 1000.0,
        });
        p.lifestyle.exercise_minutes = 30;

        let adjusted = compute_adjusted_glucose(&catalog, &p).unwrap();
        assert!((adjusted - 154.0).abs() < 1e-9, "adjusted = {}", adjusted);

        let (_, metrics) = run_daily_simulation(&catalog, &p, 7, Some(7)).unwrap();
        // Jitter is bounded by +/-10, so the weekly average stays near 154
        assert!((metrics.average_glucose - 154.0).abs() <= DAILY_JITTER_MG_DL);
    }

    #[test]
    fn test_duplicate_medication_is_rejected() {
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::Diabetic);
        p.medications.push(MedicationDose {
            drug_id: "metformin".into(),
            dose_mg: 1000.0,
        });
        p.medications.push(MedicationDose {
            drug_id: "metformin".into(),
            dose_mg: 1000.0,
        });

        let err = run_daily_simulation(&catalog, &p, 7, Some(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_seed_reproducibility() {
        let catalog = build_default_catalog();
        let p = params(Diagnosis::PreDiabetic);

        let (t1, m1) = run_daily_simulation(&catalog, &p, 7, Some(42)).unwrap();
        let (t2, m2) = run_daily_simulation(&catalog, &p, 7, Some(42)).unwrap();
        assert_eq!(t1.points, t2.points);
        assert_eq!(m1.average_glucose, m2.average_glucose);

        let (t3, _) = run_daily_simulation(&catalog, &p, 7, Some(43)).unwrap();
        assert_ne!(t1.points, t3.points);
    }

    #[test]
    fn test_exercise_monotonically_lowers_adjusted_glucose() {
        let catalog = build_default_catalog();
        let mut previous = f64::INFINITY;
        for minutes in [0, 30, 60, 90, 120] {
            let mut p = params(Diagnosis::Diabetic);
            p.lifestyle.exercise_minutes = minutes;
            let adjusted = compute_adjusted_glucose(&catalog, &p).unwrap();
            assert!(adjusted < previous, "exercise {} did not lower glucose", minutes);
            previous = adjusted;
        }
    }

    #[test]
    fn test_insulin_correction_reduces_adjusted_glucose() {
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::Diabetic);
        let without = compute_adjusted_glucose(&catalog, &p).unwrap();

        p.insulin = Some(InsulinContext {
            insulin_type: InsulinType::RapidActing,
            total_daily_dose: 36.0,
            current_reading: 200.0,
            target_reading: 120.0,
        });
        let with = compute_adjusted_glucose(&catalog, &p).unwrap();
        // correction_dose x ISF collapses to (current - target)
        assert!((without - with - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_correction_dose_floored_at_zero() {
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::Diabetic);
        let without = compute_adjusted_glucose(&catalog, &p).unwrap();

        // Already below target: no negative correction
        p.insulin = Some(InsulinContext {
            insulin_type: InsulinType::RapidActing,
            total_daily_dose: 36.0,
            current_reading: 100.0,
            target_reading: 120.0,
        });
        let with = compute_adjusted_glucose(&catalog, &p).unwrap();
        assert_eq!(without, with);
    }

    #[test]
    fn test_long_acting_insulin_is_not_applicable() {
        let catalog = build_default_catalog();
        let mut p = params(Diagnosis::Diabetic);
        let without = compute_adjusted_glucose(&catalog, &p).unwrap();

        p.insulin = Some(InsulinContext {
            insulin_type: InsulinType::LongActing,
            total_daily_dose: 36.0,
            current_reading: 200.0,
            target_reading: 120.0,
        });
        let with = compute_adjusted_glucose(&catalog, &p).unwrap();
        assert_eq!(without, with);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let catalog = build_default_catalog();
        let p = params(Diagnosis::NonDiabetic);
        let adjusted = compute_adjusted_glucose(&catalog, &p).unwrap();

        let (trajectory, _) = run_daily_simulation(&catalog, &p, 100, Some(5)).unwrap();
        assert_eq!(trajectory.len(), 100);
        for value in trajectory.values() {
            assert!((value - adjusted).abs() <= DAILY_JITTER_MG_DL + 1e-9);
        }
    }

    #[test]
    fn test_zero_samples_is_empty_trajectory_error() {
        let catalog = build_default_catalog();
        let p = params(Diagnosis::NonDiabetic);
        let err = run_daily_simulation(&catalog, &p, 0, Some(1)).unwrap_err();
        assert!(matches!(err, Error::EmptyTrajectory));
    }

    #[test]
    fn test_points_are_day_spaced() {
        let catalog = build_default_catalog();
        let p = params(Diagnosis::NonDiabetic);
        let (trajectory, _) = run_daily_simulation(&catalog, &p, 3, Some(9)).unwrap();
        let offsets: Vec<i64> = trajectory.points.iter().map(|p| p.offset_minutes).collect();
        assert_eq!(offsets, vec![0, 1440, 2880]);
    }
}
