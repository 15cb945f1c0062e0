//! Effect resolvers.
//!
//! Each resolver converts one category of input into a signed glucose
//! adjustment (mg/dL) or a multiplicative factor, independently of all
//! others, so every rule is unit-testable in isolation. Empty selections
//! resolve to zero; out-of-range values are `InvalidInput` errors.

use crate::catalog::{MedicationCatalog, MedicationCategory};
use crate::types::{
    Demographics, Diagnosis, DietInputs, Hormonal, MedicationDose, Sex, EXERCISE_MINUTES_RANGE,
    SLEEP_HOURS_RANGE, WEIGHT_LBS_RANGE,
};
use crate::{Error, Result};

/// mg/dL subtracted per minute of daily exercise
pub const EXERCISE_MG_DL_PER_MIN: f64 = 0.2;
/// mg/dL added per pound of body weight
pub const WEIGHT_MG_DL_PER_LB: f64 = 0.05;
/// mg/dL added when sleeping less than six hours
pub const SHORT_SLEEP_PENALTY: f64 = 5.0;
/// mg/dL subtracted when sleeping more than nine hours
pub const LONG_SLEEP_BONUS: f64 = 2.0;
/// mg/dL added while menstruating
pub const MENSTRUATION_OFFSET: f64 = 5.0;
/// mg/dL added during pregnancy
pub const PREGNANCY_OFFSET: f64 = 15.0;
/// Interaction-saturation multiplier when more than one glucose-lowering
/// medication is selected. A deliberate simplification, not a
/// pharmacokinetic model.
pub const MULTI_MED_DAMPENING: f64 = 0.8;
/// Lower bound of the multiplicative diet factor
pub const DIET_FACTOR_FLOOR: f64 = 0.5;

/// Summed glucose-lowering medication effect.
///
/// Per selected glucose-lowering medication the effect is
/// `effectiveness × dose_mg / 1000`; the sum is scaled by diagnosis
/// sensitivity and dampened by [`MULTI_MED_DAMPENING`] when more than one
/// glucose-lowering medication is selected. Medications from other
/// categories in the list are ignored here.
pub fn medication_effect(
    catalog: &MedicationCatalog,
    diagnosis: Diagnosis,
    medications: &[MedicationDose],
) -> Result<f64> {
    let table = catalog.glucose_lowering(diagnosis);
    let mut effect = 0.0;
    let mut selected = 0usize;

    for med in medications {
        let entry = match table.get(&med.drug_id) {
            Some(entry) => entry,
            None => continue,
        };
        if med.dose_mg < 0.0 || med.dose_mg > entry.max_dose_mg {
            return Err(Error::InvalidInput(format!(
                "dose {} mg for '{}' outside [0, {}]",
                med.dose_mg, med.drug_id, entry.max_dose_mg
            )));
        }
        effect += entry.effectiveness_coefficient * (med.dose_mg / 1000.0);
        selected += 1;
    }

    effect *= diagnosis.medication_sensitivity();
    if selected > 1 {
        effect *= MULTI_MED_DAMPENING;
    }
    Ok(effect)
}

/// Summed fixed glucose offsets from secondary-category medications.
///
/// Each blood-pressure, cholesterol, steroid, antidepressant or
/// antipsychotic selection contributes its category's fixed delta,
/// regardless of dose. The dose is still validated against the catalog
/// maximum.
pub fn secondary_medication_offset(
    catalog: &MedicationCatalog,
    medications: &[MedicationDose],
) -> Result<f64> {
    let mut offset = 0.0;
    for med in medications {
        let entry = match catalog.secondary.get(&med.drug_id) {
            Some(entry) => entry,
            None => continue,
        };
        if med.dose_mg < 0.0 || med.dose_mg > entry.max_dose_mg {
            return Err(Error::InvalidInput(format!(
                "dose {} mg for '{}' outside [0, {}]",
                med.dose_mg, med.drug_id, entry.max_dose_mg
            )));
        }
        offset += entry.fixed_glucose_delta;
    }
    Ok(offset)
}

/// Negative glucose offset from daily exercise minutes
pub fn exercise_offset(exercise_minutes: u32) -> Result<f64> {
    if exercise_minutes > EXERCISE_MINUTES_RANGE.1 {
        return Err(Error::InvalidInput(format!(
            "exercise minutes {} outside [{}, {}]",
            exercise_minutes, EXERCISE_MINUTES_RANGE.0, EXERCISE_MINUTES_RANGE.1
        )));
    }
    Ok(-EXERCISE_MG_DL_PER_MIN * f64::from(exercise_minutes))
}

/// Small positive glucose offset from body weight in pounds
pub fn weight_offset(weight_lbs: f64) -> Result<f64> {
    if !(WEIGHT_LBS_RANGE.0..=WEIGHT_LBS_RANGE.1).contains(&weight_lbs) {
        return Err(Error::InvalidInput(format!(
            "weight {} lbs outside [{}, {}]",
            weight_lbs, WEIGHT_LBS_RANGE.0, WEIGHT_LBS_RANGE.1
        )));
    }
    Ok(WEIGHT_MG_DL_PER_LB * weight_lbs)
}

/// Penalty for short sleep, small bonus for long sleep
pub fn sleep_offset(sleep_hours: f64) -> Result<f64> {
    if !(SLEEP_HOURS_RANGE.0..=SLEEP_HOURS_RANGE.1).contains(&sleep_hours) {
        return Err(Error::InvalidInput(format!(
            "sleep hours {} outside [{}, {}]",
            sleep_hours, SLEEP_HOURS_RANGE.0, SLEEP_HOURS_RANGE.1
        )));
    }
    if sleep_hours < 6.0 {
        Ok(SHORT_SLEEP_PENALTY)
    } else if sleep_hours > 9.0 {
        Ok(-LONG_SLEEP_BONUS)
    } else {
        Ok(0.0)
    }
}

/// Fixed offsets from hormonal flags. The flags are additive and
/// non-exclusive.
pub fn hormonal_offset(hormonal: &Hormonal) -> f64 {
    let mut offset = 0.0;
    if hormonal.is_menstruating {
        offset += MENSTRUATION_OFFSET;
    }
    if hormonal.is_pregnant {
        offset += PREGNANCY_OFFSET;
    }
    offset
}

/// Diet quality score from weekly food-frequency answers, floored at zero.
///
/// `3·veg/7 + 2·fruit/7 − sugary − fastfood + 2·cook/7`
pub fn diet_score(diet: &DietInputs) -> f64 {
    let score = (f64::from(diet.veg_servings) / 7.0) * 3.0
        + (f64::from(diet.fruit_servings) / 7.0) * 2.0
        - f64::from(diet.sugary_snacks)
        - f64::from(diet.fast_food_meals)
        + (f64::from(diet.home_cooked_meals) / 7.0) * 2.0;
    score.max(0.0)
}

/// Multiplicative dampening factor applied to the final adjusted glucose.
/// Never amplifies: bounded to [`DIET_FACTOR_FLOOR`, 1.0].
pub fn diet_factor(diet_score: f64) -> f64 {
    (1.0 - 0.01 * diet_score).max(DIET_FACTOR_FLOOR)
}

/// Estimated daily calorie target.
///
/// Mifflin-St Jeor basal metabolic rate with a 170 cm height placeholder,
/// scaled by the activity-level multiplier.
pub fn daily_calorie_target(demographics: &Demographics) -> u32 {
    const HEIGHT_CM_PLACEHOLDER: f64 = 170.0;
    let base = 10.0 * demographics.weight_kg + 6.25 * HEIGHT_CM_PLACEHOLDER
        - 5.0 * f64::from(demographics.age);
    let bmr = match demographics.sex {
        Sex::Male => base + 5.0,
        Sex::Female | Sex::Other => base - 161.0,
    };
    (bmr * demographics.activity_level.calorie_multiplier()).max(0.0) as u32
}
