//! Core domain types for the glucose simulation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Patient parameter sets (demographics, diagnosis, medications, lifestyle)
//! - Insulin correction context
//! - Glucose trajectories and derived metrics
//! - CGM synthesis parameters

use crate::catalog::MedicationCatalog;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kilograms per pound, used to canonicalize weight input.
pub const KG_PER_LB: f64 = 0.45359237;

/// Declared range for patient age in years.
pub const AGE_RANGE: (u32, u32) = (10, 100);
/// Declared range for patient weight in pounds.
pub const WEIGHT_LBS_RANGE: (f64, f64) = (60.0, 400.0);
/// Declared range for daily exercise in minutes.
pub const EXERCISE_MINUTES_RANGE: (u32, u32) = (0, 120);
/// Declared range for nightly sleep in hours.
pub const SLEEP_HOURS_RANGE: (f64, f64) = (3.0, 12.0);
/// Declared range for weekly vegetable/fruit/snack servings.
pub const WEEKLY_SERVINGS_RANGE: (u32, u32) = (0, 70);
/// Declared range for weekly fast food meals.
pub const FAST_FOOD_RANGE: (u32, u32) = (0, 14);
/// Declared range for weekly home-cooked meals.
pub const HOME_COOKED_RANGE: (u32, u32) = (0, 21);

// ============================================================================
// Patient Parameter Types
// ============================================================================

/// Glucose status of the simulated patient
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    NonDiabetic,
    PreDiabetic,
    Diabetic,
}

impl Diagnosis {
    /// Baseline glucose in mg/dL before any adjustment
    pub fn baseline_glucose(&self) -> f64 {
        match self {
            Diagnosis::NonDiabetic => 110.0,
            Diagnosis::PreDiabetic => 125.0,
            Diagnosis::Diabetic => 160.0,
        }
    }

    /// Sensitivity scaling applied to the summed glucose-lowering
    /// medication effect
    pub fn medication_sensitivity(&self) -> f64 {
        match self {
            Diagnosis::NonDiabetic => 0.3,
            Diagnosis::PreDiabetic => 0.7,
            Diagnosis::Diabetic => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Self-reported activity level, used for the daily calorie target
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    /// Calorie multiplier applied to the basal metabolic rate
    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }
}

/// Patient demographics. Weight is canonical in kilograms; the legacy
/// trajectory arithmetic consumes pounds via [`Demographics::weight_lbs`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    pub weight_kg: f64,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
}

impl Demographics {
    /// Weight in pounds, as consumed by the trajectory formula
    pub fn weight_lbs(&self) -> f64 {
        self.weight_kg / KG_PER_LB
    }
}

/// Weekly food-frequency answers from the diet questionnaire
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DietInputs {
    pub veg_servings: u32,
    pub fruit_servings: u32,
    pub sugary_snacks: u32,
    pub fast_food_meals: u32,
    pub home_cooked_meals: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lifestyle {
    pub exercise_minutes: u32,
    pub sleep_hours: f64,
    pub diet: DietInputs,
}

/// Hormonal flags. The two flags are not mutually exclusive.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Hormonal {
    pub is_menstruating: bool,
    pub is_pregnant: bool,
}

/// A selected medication with its daily dose
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationDose {
    pub drug_id: String,
    pub dose_mg: f64,
}

/// Insulin types recognised by the ISF calculator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsulinType {
    RapidActing,
    ShortActing,
    IntermediateActing,
    LongActing,
}

/// Optional insulin correction context for the daily simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsulinContext {
    pub insulin_type: InsulinType,
    /// Total daily insulin dose in units
    pub total_daily_dose: f64,
    /// Current glucose reading in mg/dL
    pub current_reading: f64,
    /// Target glucose reading in mg/dL
    pub target_reading: f64,
}

impl InsulinContext {
    /// Insulin Sensitivity Factor: mg/dL dropped per unit of insulin.
    ///
    /// Only rapid-acting (1800 rule) and short-acting (1500 rule) insulin
    /// produce an ISF. Intermediate- and long-acting insulin return `None`,
    /// which callers must surface as "not applicable" rather than zero.
    pub fn isf(&self) -> Option<f64> {
        if self.total_daily_dose <= 0.0 {
            return None;
        }
        match self.insulin_type {
            InsulinType::RapidActing => Some(1800.0 / self.total_daily_dose),
            InsulinType::ShortActing => Some(1500.0 / self.total_daily_dose),
            InsulinType::IntermediateActing | InsulinType::LongActing => None,
        }
    }
}

/// Validated, immutable record of all simulation inputs.
///
/// Built once per simulation request, passed by value into the engine and
/// discarded after trajectory generation. The engine holds no state across
/// calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSet {
    pub demographics: Demographics,
    pub diagnosis: Diagnosis,
    /// Ordered medication selections across all categories
    pub medications: Vec<MedicationDose>,
    pub lifestyle: Lifestyle,
    pub hormonal: Hormonal,
    pub insulin: Option<InsulinContext>,
}

fn clamp_u32(value: u32, range: (u32, u32)) -> u32 {
    value.clamp(range.0, range.1)
}

fn clamp_f64(value: f64, range: (f64, f64)) -> f64 {
    value.clamp(range.0, range.1)
}

impl ParameterSet {
    /// Clamp every numeric field to its declared range and validate the
    /// medication selections against the catalog.
    ///
    /// Dose-versus-maximum violations, unknown drug identifiers and
    /// repeated selections of the same drug are `InvalidInput` errors;
    /// demographic and lifestyle numerics are clamped rather than
    /// rejected.
    pub fn normalized(&self, catalog: &MedicationCatalog) -> Result<ParameterSet> {
        let mut params = self.clone();

        params.demographics.age = clamp_u32(params.demographics.age, AGE_RANGE);
        let weight_lbs = clamp_f64(params.demographics.weight_lbs(), WEIGHT_LBS_RANGE);
        params.demographics.weight_kg = weight_lbs * KG_PER_LB;

        params.lifestyle.exercise_minutes =
            clamp_u32(params.lifestyle.exercise_minutes, EXERCISE_MINUTES_RANGE);
        params.lifestyle.sleep_hours = clamp_f64(params.lifestyle.sleep_hours, SLEEP_HOURS_RANGE);

        let diet = &mut params.lifestyle.diet;
        diet.veg_servings = clamp_u32(diet.veg_servings, WEEKLY_SERVINGS_RANGE);
        diet.fruit_servings = clamp_u32(diet.fruit_servings, WEEKLY_SERVINGS_RANGE);
        diet.sugary_snacks = clamp_u32(diet.sugary_snacks, WEEKLY_SERVINGS_RANGE);
        diet.fast_food_meals = clamp_u32(diet.fast_food_meals, FAST_FOOD_RANGE);
        diet.home_cooked_meals = clamp_u32(diet.home_cooked_meals, HOME_COOKED_RANGE);

        let mut seen = HashSet::new();
        for med in &params.medications {
            // The selection is a set: summing one drug twice would dodge
            // its per-drug dose cap
            if !seen.insert(med.drug_id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "medication '{}' selected more than once",
                    med.drug_id
                )));
            }
            let entry = catalog.find(params.diagnosis, &med.drug_id).ok_or_else(|| {
                Error::InvalidInput(format!("unknown medication '{}'", med.drug_id))
            })?;
            if med.dose_mg < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "dose for '{}' must be non-negative, got {}",
                    med.drug_id, med.dose_mg
                )));
            }
            if med.dose_mg > entry.max_dose_mg {
                return Err(Error::InvalidInput(format!(
                    "dose {} mg for '{}' exceeds catalog maximum {} mg",
                    med.dose_mg, med.drug_id, entry.max_dose_mg
                )));
            }
        }

        if let Some(insulin) = &params.insulin {
            if insulin.total_daily_dose < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "total daily insulin dose must be non-negative, got {}",
                    insulin.total_daily_dose
                )));
            }
        }

        Ok(params)
    }
}

// ============================================================================
// Trajectory and Metric Types
// ============================================================================

/// A single sampled glucose reading, offset in minutes from the trajectory
/// start
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub offset_minutes: i64,
    pub glucose_mg_dl: f64,
}

/// An ordered, finite glucose time series.
///
/// Regenerating with the same parameter set and an explicit seed reproduces
/// the identical point sequence; without a seed, runs diverge only in the
/// random jitter term.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlucoseTrajectory {
    pub start: DateTime<Utc>,
    pub points: Vec<TrajectoryPoint>,
}

impl GlucoseTrajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Glucose values in sample order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.glucose_mg_dl)
    }

    /// Absolute timestamp of a point
    pub fn timestamp_of(&self, point: &TrajectoryPoint) -> DateTime<Utc> {
        self.start + Duration::minutes(point.offset_minutes)
    }
}

/// Summary statistics derived from a trajectory.
///
/// Recomputed fresh from a [`GlucoseTrajectory`] each time, never mutated
/// in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub average_glucose: f64,
    pub estimated_hba1c: f64,
    pub time_in_range_pct: f64,
    pub hypoglycemia_pct: f64,
    pub hyperglycemia_pct: f64,
    /// Constant offset from the average, kept for display compatibility
    pub fasting_glucose_estimate: f64,
    /// Constant offset from the average, kept for display compatibility
    pub post_meal_glucose_estimate: f64,
}

// ============================================================================
// CGM Synthesis Parameters
// ============================================================================

/// Inputs for the periodic CGM synthesizer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SynthesisParams {
    pub num_days: u32,
    pub readings_per_day: u32,
    /// Baseline glucose in mg/dL
    pub baseline: f64,
    /// Standard deviation of the Gaussian noise term
    pub variability: f64,
    /// Meal effect amplitude in mg/dL
    pub meal_amplitude: f64,
    /// Exercise drop amplitude in mg/dL
    pub exercise_amplitude: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            num_days: 7,
            readings_per_day: 96,
            baseline: 110.0,
            variability: 15.0,
            meal_amplitude: 40.0,
            exercise_amplitude: 25.0,
        }
    }
}

impl SynthesisParams {
    /// Clamp every field to its declared range
    pub fn normalized(&self) -> SynthesisParams {
        SynthesisParams {
            num_days: self.num_days.clamp(1, 14),
            readings_per_day: self.readings_per_day.clamp(1, 288),
            baseline: self.baseline.clamp(70.0, 180.0),
            variability: self.variability.clamp(0.0, 50.0),
            meal_amplitude: self.meal_amplitude.clamp(0.0, 100.0),
            exercise_amplitude: self.exercise_amplitude.clamp(0.0, 80.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;

    fn base_params() -> ParameterSet {
        ParameterSet {
            demographics: Demographics {
                age: 45,
                weight_kg: 150.0 * KG_PER_LB,
                sex: Sex::Other,
                activity_level: ActivityLevel::Sedentary,
            },
            diagnosis: Diagnosis::NonDiabetic,
            medications: vec![],
            lifestyle: Lifestyle {
                exercise_minutes: 30,
                sleep_hours: 7.0,
                diet: DietInputs::default(),
            },
            hormonal: Hormonal::default(),
            insulin: None,
        }
    }

    #[test]
    fn test_weight_lbs_roundtrip() {
        let demographics = Demographics {
            age: 45,
            weight_kg: 150.0 * KG_PER_LB,
            sex: Sex::Male,
            activity_level: ActivityLevel::Sedentary,
        };
        assert!((demographics.weight_lbs() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_clamps_out_of_range_fields() {
        let catalog = build_default_catalog();
        let mut params = base_params();
        params.demographics.age = 150;
        params.lifestyle.exercise_minutes = 500;
        params.lifestyle.sleep_hours = 1.0;
        params.lifestyle.diet.fast_food_meals = 99;

        let normalized = params.normalized(&catalog).unwrap();
        assert_eq!(normalized.demographics.age, 100);
        assert_eq!(normalized.lifestyle.exercise_minutes, 120);
        assert_eq!(normalized.lifestyle.sleep_hours, 3.0);
        assert_eq!(normalized.lifestyle.diet.fast_food_meals, 14);
    }

    #[test]
    fn test_normalized_rejects_dose_above_catalog_max() {
        let catalog = build_default_catalog();
        let mut params = base_params();
        params.diagnosis = Diagnosis::Diabetic;
        params.medications.push(MedicationDose {
            drug_id: "metformin".into(),
            dose_mg: 5000.0,
        });

        let err = params.normalized(&catalog).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_normalized_rejects_duplicate_medication() {
        // Two metformin entries would sum to a 2000 mg-equivalent effect
        // while each stays under the 2000 mg per-drug cap
        let catalog = build_default_catalog();
        let mut params = base_params();
        params.diagnosis = Diagnosis::Diabetic;
        for _ in 0..2 {
            params.medications.push(MedicationDose {
                drug_id: "metformin".into(),
                dose_mg: 1000.0,
            });
        }

        let err = params.normalized(&catalog).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_normalized_rejects_unknown_drug() {
        let catalog = build_default_catalog();
        let mut params = base_params();
        params.medications.push(MedicationDose {
            drug_id: "snake_oil".into(),
            dose_mg: 10.0,
        });

        let err = params.normalized(&catalog).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_isf_rapid_acting() {
        let ctx = InsulinContext {
            insulin_type: InsulinType::RapidActing,
            total_daily_dose: 36.0,
            current_reading: 200.0,
            target_reading: 120.0,
        };
        assert_eq!(ctx.isf(), Some(50.0));
    }

    #[test]
    fn test_isf_short_acting() {
        let ctx = InsulinContext {
            insulin_type: InsulinType::ShortActing,
            total_daily_dose: 50.0,
            current_reading: 200.0,
            target_reading: 120.0,
        };
        assert_eq!(ctx.isf(), Some(30.0));
    }

    #[test]
    fn test_isf_not_applicable_for_long_acting() {
        let ctx = InsulinContext {
            insulin_type: InsulinType::LongActing,
            total_daily_dose: 40.0,
            current_reading: 200.0,
            target_reading: 120.0,
        };
        assert_eq!(ctx.isf(), None);
    }

    #[test]
    fn test_isf_none_for_zero_tdd() {
        let ctx = InsulinContext {
            insulin_type: InsulinType::RapidActing,
            total_daily_dose: 0.0,
            current_reading: 200.0,
            target_reading: 120.0,
        };
        assert_eq!(ctx.isf(), None);
    }

    #[test]
    fn test_synthesis_params_clamped() {
        let params = SynthesisParams {
            num_days: 100,
            readings_per_day: 0,
            baseline: 500.0,
            variability: -3.0,
            meal_amplitude: 400.0,
            exercise_amplitude: 90.0,
        };
        let normalized = params.normalized();
        assert_eq!(normalized.num_days, 14);
        assert_eq!(normalized.readings_per_day, 1);
        assert_eq!(normalized.baseline, 180.0);
        assert_eq!(normalized.variability, 0.0);
        assert_eq!(normalized.meal_amplitude, 100.0);
        assert_eq!(normalized.exercise_amplitude, 80.0);
    }

    #[test]
    fn test_diagnosis_baselines() {
        assert_eq!(Diagnosis::NonDiabetic.baseline_glucose(), 110.0);
        assert_eq!(Diagnosis::PreDiabetic.baseline_glucose(), 125.0);
        assert_eq!(Diagnosis::Diabetic.baseline_glucose(), 160.0);
    }
}
