//! Static medication catalog.
//!
//! Reference data for every medication the simulator recognises, keyed by
//! stable drug identifier. Display names are presentation attributes only
//! and never used for lookups. The catalog is built once and is immutable
//! for the process lifetime.

use crate::types::Diagnosis;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Medication category, each with a distinct effect-application rule
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MedicationCategory {
    /// Effect scales with dose: `effectiveness × dose_mg / 1000`
    GlucoseLowering,
    BloodPressure,
    Cholesterol,
    Steroid,
    Antidepressant,
    Antipsychotic,
}

impl MedicationCategory {
    /// Fixed glucose increase in mg/dL added per selection, for the
    /// non-dose categories. Constants preserve the relative glycemic
    /// impact used by the legacy displays.
    pub fn fixed_glucose_delta(&self) -> f64 {
        match self {
            MedicationCategory::GlucoseLowering => 0.0,
            MedicationCategory::BloodPressure => 5.0,
            MedicationCategory::Cholesterol => 7.0,
            MedicationCategory::Steroid => 12.0,
            MedicationCategory::Antidepressant => 10.0,
            MedicationCategory::Antipsychotic => 15.0,
        }
    }
}

/// One catalog entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationCatalogEntry {
    pub drug_id: String,
    pub display_name: String,
    pub category: MedicationCategory,
    /// Glucose-lowering potency per 1000 mg-equivalent dose. Only
    /// meaningful for the glucose-lowering category; zero otherwise.
    pub effectiveness_coefficient: f64,
    pub max_dose_mg: f64,
    /// mg/dL added per selection for non-dose categories
    pub fixed_glucose_delta: f64,
}

/// The complete medication catalog.
///
/// Glucose-lowering medications live in diagnosis-specific tables because
/// the same drug carries different effectiveness depending on glucose
/// status (e.g. metformin: 0.50 for diabetic, 0.40 for pre-diabetic).
#[derive(Clone, Debug)]
pub struct MedicationCatalog {
    pub diabetic: HashMap<String, MedicationCatalogEntry>,
    pub pre_diabetic: HashMap<String, MedicationCatalogEntry>,
    pub secondary: HashMap<String, MedicationCatalogEntry>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<MedicationCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static MedicationCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default medication catalog
///
/// **Note**: For production use, prefer `default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> MedicationCatalog {
    build_default_catalog_internal()
}

fn glucose_lowering(id: &str, name: &str, effectiveness: f64, max_dose_mg: f64) -> (String, MedicationCatalogEntry) {
    (
        id.to_string(),
        MedicationCatalogEntry {
            drug_id: id.to_string(),
            display_name: name.to_string(),
            category: MedicationCategory::GlucoseLowering,
            effectiveness_coefficient: effectiveness,
            max_dose_mg,
            fixed_glucose_delta: 0.0,
        },
    )
}

fn secondary(id: &str, name: &str, category: MedicationCategory, max_dose_mg: f64) -> (String, MedicationCatalogEntry) {
    (
        id.to_string(),
        MedicationCatalogEntry {
            drug_id: id.to_string(),
            display_name: name.to_string(),
            category,
            effectiveness_coefficient: 0.0,
            max_dose_mg,
            fixed_glucose_delta: category.fixed_glucose_delta(),
        },
    )
}

fn build_default_catalog_internal() -> MedicationCatalog {
    use MedicationCategory::*;

    let diabetic = HashMap::from([
        glucose_lowering("insulin", "Insulin", 1.00, 200.0),
        glucose_lowering("sulfonylureas", "Sulfonylureas", 0.70, 20.0),
        glucose_lowering("metformin", "Metformin", 0.50, 2000.0),
        glucose_lowering("glp1_agonists", "GLP-1 Receptor Agonists", 0.60, 5.0),
        glucose_lowering("sglt2_inhibitors", "SGLT2 Inhibitors", 0.40, 25.0),
        glucose_lowering("tzds", "Thiazolidinediones (TZDs)", 0.45, 45.0),
        glucose_lowering("dpp4_inhibitors", "DPP-4 Inhibitors", 0.30, 100.0),
        glucose_lowering("meglitinides", "Meglitinides", 0.55, 16.0),
        glucose_lowering("alpha_glucosidase_inhibitors", "Alpha-glucosidase Inhibitors", 0.35, 100.0),
        glucose_lowering("amylin_analogs", "Amylin Analogs", 0.25, 120.0),
    ]);

    let pre_diabetic = HashMap::from([
        glucose_lowering("metformin", "Metformin", 0.40, 2000.0),
        glucose_lowering("lifestyle_coaching", "Lifestyle Coaching", 0.30, 1.0),
        glucose_lowering("weight_loss_agents", "Weight Loss Agents", 0.20, 200.0),
        glucose_lowering("glp1_agonists", "GLP-1 Receptor Agonists", 0.45, 5.0),
        glucose_lowering("alpha_glucosidase_inhibitors", "Alpha-glucosidase Inhibitors", 0.25, 100.0),
        glucose_lowering("tzds", "Thiazolidinediones (TZDs)", 0.35, 45.0),
        glucose_lowering("acarbose", "Acarbose", 0.30, 100.0),
        glucose_lowering("intermittent_fasting", "Intermittent Fasting Protocols", 0.25, 1.0),
    ]);

    let secondary = HashMap::from([
        // Blood pressure
        secondary("beta_blockers", "Beta Blockers", BloodPressure, 200.0),
        secondary("ace_inhibitors", "ACE Inhibitors", BloodPressure, 40.0),
        secondary("arbs", "Angiotensin II Receptor Blockers (ARBs)", BloodPressure, 320.0),
        secondary("ccbs", "Calcium Channel Blockers", BloodPressure, 240.0),
        secondary("diuretics", "Diuretics", BloodPressure, 100.0),
        secondary("alpha_blockers", "Alpha Blockers", BloodPressure, 20.0),
        secondary("vasodilators", "Vasodilators", BloodPressure, 40.0),
        secondary("central_agonists", "Central Agonists", BloodPressure, 100.0),
        // Cholesterol
        secondary("statins", "Statins", Cholesterol, 80.0),
        secondary("fibrates", "Fibrates", Cholesterol, 200.0),
        secondary("niacin", "Niacin", Cholesterol, 2000.0),
        secondary("bile_acid_sequestrants", "Bile Acid Sequestrants", Cholesterol, 15000.0),
        secondary("cholesterol_absorption_inhibitors", "Cholesterol Absorption Inhibitors", Cholesterol, 10.0),
        secondary("pcsk9_inhibitors", "PCSK9 Inhibitors", Cholesterol, 420.0),
        secondary("omega3_fatty_acids", "Omega-3 Fatty Acids", Cholesterol, 4000.0),
        // Steroids
        secondary("prednisone", "Prednisone", Steroid, 60.0),
        secondary("hydrocortisone", "Hydrocortisone", Steroid, 100.0),
        secondary("dexamethasone", "Dexamethasone", Steroid, 20.0),
        secondary("methylprednisolone", "Methylprednisolone", Steroid, 80.0),
        // Antidepressants
        secondary("ssris", "SSRIs", Antidepressant, 100.0),
        secondary("snris", "SNRIs", Antidepressant, 200.0),
        secondary("tricyclics", "Tricyclics", Antidepressant, 150.0),
        secondary("mao_inhibitors", "MAO Inhibitors", Antidepressant, 60.0),
        // Antipsychotics
        secondary("olanzapine", "Olanzapine", Antipsychotic, 20.0),
        secondary("risperidone", "Risperidone", Antipsychotic, 8.0),
        secondary("quetiapine", "Quetiapine", Antipsychotic, 800.0),
        secondary("aripiprazole", "Aripiprazole", Antipsychotic, 30.0),
    ]);

    MedicationCatalog {
        diabetic,
        pre_diabetic,
        secondary,
    }
}

impl MedicationCatalog {
    /// The glucose-lowering table that applies for a diagnosis.
    ///
    /// Non-diabetic patients fall back to the pre-diabetic table; the
    /// diagnosis sensitivity scaling (x0.3) accounts for the difference.
    pub fn glucose_lowering(&self, diagnosis: Diagnosis) -> &HashMap<String, MedicationCatalogEntry> {
        match diagnosis {
            Diagnosis::Diabetic => &self.diabetic,
            Diagnosis::PreDiabetic | Diagnosis::NonDiabetic => &self.pre_diabetic,
        }
    }

    /// Look up an entry by id, checking the diagnosis-appropriate
    /// glucose-lowering table first and the secondary table second
    pub fn find(&self, diagnosis: Diagnosis, drug_id: &str) -> Option<&MedicationCatalogEntry> {
        self.glucose_lowering(diagnosis)
            .get(drug_id)
            .or_else(|| self.secondary.get(drug_id))
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let tables = [
            ("diabetic", &self.diabetic),
            ("pre_diabetic", &self.pre_diabetic),
            ("secondary", &self.secondary),
        ];

        for (table_name, table) in tables {
            for (id, entry) in table {
                if id.is_empty() || entry.drug_id.is_empty() {
                    errors.push(format!("{} table has an entry with empty ID", table_name));
                }
                if id != &entry.drug_id {
                    errors.push(format!(
                        "{} table key '{}' doesn't match entry.drug_id '{}'",
                        table_name, id, entry.drug_id
                    ));
                }
                if entry.display_name.is_empty() {
                    errors.push(format!("Medication '{}' has empty display name", id));
                }
                if !(0.0..=1.0).contains(&entry.effectiveness_coefficient) {
                    errors.push(format!(
                        "Medication '{}': effectiveness {} outside [0, 1]",
                        id, entry.effectiveness_coefficient
                    ));
                }
                if entry.max_dose_mg <= 0.0 {
                    errors.push(format!(
                        "Medication '{}': max dose {} must be positive",
                        id, entry.max_dose_mg
                    ));
                }
                if entry.fixed_glucose_delta < 0.0 {
                    errors.push(format!(
                        "Medication '{}': fixed glucose delta {} must be non-negative",
                        id, entry.fixed_glucose_delta
                    ));
                }
            }
        }

        for table in [&self.diabetic, &self.pre_diabetic] {
            for (id, entry) in table {
                if entry.category != MedicationCategory::GlucoseLowering {
                    errors.push(format!(
                        "Medication '{}' in a glucose-lowering table has category {:?}",
                        id, entry.category
                    ));
                }
            }
        }

        for (id, entry) in &self.secondary {
            if entry.category == MedicationCategory::GlucoseLowering {
                errors.push(format!(
                    "Medication '{}' in the secondary table is glucose-lowering",
                    id
                ));
            }
            if entry.fixed_glucose_delta != entry.category.fixed_glucose_delta() {
                errors.push(format!(
                    "Medication '{}': delta {} doesn't match category constant {}",
                    id,
                    entry.fixed_glucose_delta,
                    entry.category.fixed_glucose_delta()
                ));
            }
        }

        // Every secondary category must be represented
        for category in [
            MedicationCategory::BloodPressure,
            MedicationCategory::Cholesterol,
            MedicationCategory::Steroid,
            MedicationCategory::Antidepressant,
            MedicationCategory::Antipsychotic,
        ] {
            if !self.secondary.values().any(|e| e.category == category) {
                errors.push(format!("Catalog has no {:?} medications", category));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.diabetic.len(), 10);
        assert_eq!(catalog.pre_diabetic.len(), 8);
        assert_eq!(catalog.secondary.len(), 27);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_metformin_effectiveness_depends_on_diagnosis() {
        let catalog = build_default_catalog();
        let diabetic = catalog.find(Diagnosis::Diabetic, "metformin").unwrap();
        let pre = catalog.find(Diagnosis::PreDiabetic, "metformin").unwrap();
        assert_eq!(diabetic.effectiveness_coefficient, 0.50);
        assert_eq!(pre.effectiveness_coefficient, 0.40);
    }

    #[test]
    fn test_secondary_lookup_works_for_any_diagnosis() {
        let catalog = build_default_catalog();
        for diagnosis in [
            Diagnosis::NonDiabetic,
            Diagnosis::PreDiabetic,
            Diagnosis::Diabetic,
        ] {
            let entry = catalog.find(diagnosis, "prednisone").unwrap();
            assert_eq!(entry.category, MedicationCategory::Steroid);
            assert_eq!(entry.fixed_glucose_delta, 12.0);
        }
    }

    #[test]
    fn test_category_deltas() {
        assert_eq!(MedicationCategory::BloodPressure.fixed_glucose_delta(), 5.0);
        assert_eq!(MedicationCategory::Cholesterol.fixed_glucose_delta(), 7.0);
        assert_eq!(MedicationCategory::Steroid.fixed_glucose_delta(), 12.0);
        assert_eq!(MedicationCategory::Antidepressant.fixed_glucose_delta(), 10.0);
        assert_eq!(MedicationCategory::Antipsychotic.fixed_glucose_delta(), 15.0);
    }

    #[test]
    fn test_unknown_drug_not_found() {
        let catalog = build_default_catalog();
        assert!(catalog.find(Diagnosis::Diabetic, "placebo").is_none());
    }
}
