//! Text recommendations derived from simulation metrics and lifestyle
//! inputs. These are plain-language, educational hints, not medical
//! advice.

use crate::resolvers::diet_score;
use crate::types::{Lifestyle, SimulationMetrics};

/// Average glucose above which aerobic activity is recommended
const HIGH_AVERAGE_MG_DL: f64 = 150.0;
/// Average glucose below which hypoglycemia is flagged
const LOW_AVERAGE_MG_DL: f64 = 80.0;
const MIN_TIME_IN_RANGE_PCT: f64 = 70.0;
const MAX_HYPO_PCT: f64 = 5.0;
const MAX_HYPER_PCT: f64 = 30.0;
const MIN_DAILY_EXERCISE_MINUTES: u32 = 30;

/// Build glucose and lifestyle recommendations.
///
/// Lifestyle hints are only produced when the lifestyle inputs are
/// available (the CGM upload path has none).
pub fn recommendations(
    metrics: &SimulationMetrics,
    lifestyle: Option<&Lifestyle>,
) -> Vec<String> {
    let mut advice = Vec::new();

    if metrics.average_glucose > HIGH_AVERAGE_MG_DL {
        advice.push(
            "High average glucose: review carbohydrate intake, exercise, and medications."
                .to_string(),
        );
    } else if metrics.average_glucose < LOW_AVERAGE_MG_DL {
        advice.push(
            "Low average glucose, possible hypoglycemia. Adjust carbohydrate intake or medication timing."
                .to_string(),
        );
    } else {
        advice.push("Glucose levels are within a healthy range.".to_string());
    }

    if metrics.time_in_range_pct < MIN_TIME_IN_RANGE_PCT {
        advice.push(
            "Time in range below 70%. Consider reducing sugar or increasing post-meal activity."
                .to_string(),
        );
    }
    if metrics.hypoglycemia_pct > MAX_HYPO_PCT {
        advice.push(
            "Frequent low glucose events: discuss insulin or medication timing with a clinician."
                .to_string(),
        );
    }
    if metrics.hyperglycemia_pct > MAX_HYPER_PCT {
        advice.push(
            "Frequent high glucose: limit refined carbs and add aerobic activity after meals."
                .to_string(),
        );
    }

    if let Some(lifestyle) = lifestyle {
        if lifestyle.exercise_minutes < MIN_DAILY_EXERCISE_MINUTES {
            advice.push(
                "Increase daily exercise to at least 30 minutes for improved insulin sensitivity."
                    .to_string(),
            );
        } else {
            advice.push("Exercise duration meets the daily recommendation.".to_string());
        }

        let score = diet_score(&lifestyle.diet);
        if score < 10.0 {
            advice.push(
                "Improve diet quality: add more vegetables, fiber, and lean protein.".to_string(),
            );
        } else if score > 20.0 {
            advice.push("Excellent diet quality, keep it up!".to_string());
        }
    }

    advice
}
