use clap::{Args, Parser, Subcommand};
use glucosim_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glucosim")]
#[command(about = "Glucose response simulation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the export directory for --export
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily glucose simulation from patient inputs
    Daily(DailyArgs),

    /// Synthesize a continuous glucose monitor trace
    Cgm(CgmArgs),

    /// Derive metrics and recommendations from an uploaded CGM CSV
    Analyze {
        /// Path to a two-column CSV (timestamp, glucose mg/dL)
        file: PathBuf,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the medication catalog
    Meds {
        /// Diagnosis selecting the glucose-lowering table
        /// (non-diabetic, pre-diabetic, diabetic)
        #[arg(long, default_value = "diabetic")]
        diagnosis: String,
    },
}

#[derive(Args)]
struct DailyArgs {
    /// Age in years
    #[arg(long, default_value_t = 45)]
    age: u32,

    /// Weight in pounds
    #[arg(long, default_value_t = 150.0)]
    weight_lbs: f64,

    /// Sex (male, female, other)
    #[arg(long, default_value = "other")]
    sex: String,

    /// Activity level (sedentary, light, moderate, very-active, athlete)
    #[arg(long, default_value = "sedentary")]
    activity: String,

    /// Glucose status (non-diabetic, pre-diabetic, diabetic)
    #[arg(long, default_value = "non-diabetic")]
    diagnosis: String,

    /// Medication selection, repeatable (e.g. --med metformin:1000)
    #[arg(long = "med", value_name = "DRUG_ID:DOSE_MG")]
    medications: Vec<String>,

    /// Daily exercise in minutes
    #[arg(long, default_value_t = 30)]
    exercise_minutes: u32,

    /// Average sleep in hours per night
    #[arg(long, default_value_t = 7.0)]
    sleep_hours: f64,

    /// Vegetable servings per week
    #[arg(long, default_value_t = 21)]
    veg_servings: u32,

    /// Fruit servings per week
    #[arg(long, default_value_t = 14)]
    fruit_servings: u32,

    /// Sugary snacks/drinks per week
    #[arg(long, default_value_t = 14)]
    sugary_snacks: u32,

    /// Fast food meals per week
    #[arg(long, default_value_t = 3)]
    fast_food_meals: u32,

    /// Home-cooked meals per week
    #[arg(long, default_value_t = 5)]
    home_cooked_meals: u32,

    /// Patient is currently menstruating
    #[arg(long)]
    menstruating: bool,

    /// Patient is currently pregnant
    #[arg(long)]
    pregnant: bool,

    /// Insulin type for the ISF correction (rapid, short, intermediate, long)
    #[arg(long, requires = "total_daily_dose")]
    insulin_type: Option<String>,

    /// Total daily insulin dose in units
    #[arg(long)]
    total_daily_dose: Option<f64>,

    /// Current glucose reading in mg/dL for the correction
    #[arg(long, default_value_t = 180.0)]
    current_glucose: f64,

    /// Target glucose reading in mg/dL for the correction
    #[arg(long, default_value_t = 120.0)]
    target_glucose: f64,

    /// Number of daily samples to generate
    #[arg(long)]
    points: Option<usize>,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print metrics as JSON
    #[arg(long)]
    json: bool,

    /// Write the trajectory to a specific CSV path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the trajectory CSV into the configured export directory
    #[arg(long)]
    export: bool,
}

#[derive(Args)]
struct CgmArgs {
    /// Number of days to simulate (1-14)
    #[arg(long)]
    num_days: Option<u32>,

    /// Readings per day (up to 288)
    #[arg(long)]
    readings_per_day: Option<u32>,

    /// Baseline glucose in mg/dL
    #[arg(long)]
    baseline: Option<f64>,

    /// Glucose variability (standard deviation)
    #[arg(long)]
    variability: Option<f64>,

    /// Meal effect amplitude in mg/dL
    #[arg(long)]
    meal_amplitude: Option<f64>,

    /// Exercise drop amplitude in mg/dL
    #[arg(long)]
    exercise_amplitude: Option<f64>,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print metrics as JSON
    #[arg(long)]
    json: bool,

    /// Write the trajectory to a specific CSV path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the trajectory CSV into the configured export directory
    #[arg(long)]
    export: bool,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    metrics: &'a SimulationMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_calorie_target: Option<u32>,
    recommendations: &'a [String],
}

fn main() -> Result<()> {
    glucosim_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.export_dir {
        config.data.export_dir = dir;
    }

    let catalog = default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    match cli.command {
        Commands::Daily(args) => cmd_daily(catalog, &config, args),
        Commands::Cgm(args) => cmd_cgm(&config, args),
        Commands::Analyze { file, json } => cmd_analyze(&file, json),
        Commands::Meds { diagnosis } => cmd_meds(catalog, &diagnosis),
    }
}

fn cmd_daily(catalog: &MedicationCatalog, config: &Config, args: DailyArgs) -> Result<()> {
    let medications = args
        .medications
        .iter()
        .map(|raw| parse_medication(raw))
        .collect::<Result<Vec<_>>>()?;

    let insulin = match (&args.insulin_type, args.total_daily_dose) {
        (Some(raw), Some(tdd)) => Some(InsulinContext {
            insulin_type: parse_insulin_type(raw)?,
            total_daily_dose: tdd,
            current_reading: args.current_glucose,
            target_reading: args.target_glucose,
        }),
        _ => None,
    };

    let params = ParameterSet {
        demographics: Demographics {
            age: args.age,
            weight_kg: args.weight_lbs * KG_PER_LB,
            sex: parse_sex(&args.sex)?,
            activity_level: parse_activity(&args.activity)?,
        },
        diagnosis: parse_diagnosis(&args.diagnosis)?,
        medications,
        lifestyle: Lifestyle {
            exercise_minutes: args.exercise_minutes,
            sleep_hours: args.sleep_hours,
            diet: DietInputs {
                veg_servings: args.veg_servings,
                fruit_servings: args.fruit_servings,
                sugary_snacks: args.sugary_snacks,
                fast_food_meals: args.fast_food_meals,
                home_cooked_meals: args.home_cooked_meals,
            },
        },
        hormonal: Hormonal {
            is_menstruating: args.menstruating,
            is_pregnant: args.pregnant,
        },
        insulin,
    };

    let sample_count = args.points.unwrap_or(config.simulation.sample_count);
    let (trajectory, metrics) =
        run_daily_simulation(catalog, &params, sample_count, args.seed)?;

    if let Some(path) = export_path(args.csv, args.export, config, "daily_trajectory.csv") {
        export_trajectory(&trajectory, &path)?;
        println!("Trajectory written to {}", path.display());
    }

    let calorie_target = resolvers::daily_calorie_target(&params.demographics);
    let advice = recommendations(&metrics, Some(&params.lifestyle));

    if args.json {
        let report = Report {
            metrics: &metrics,
            daily_calorie_target: Some(calorie_target),
            recommendations: &advice,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_metrics("DAILY SIMULATION", &metrics);
    println!("  Estimated daily calories: {} kcal", calorie_target);
    if let Some(insulin) = &params.insulin {
        match insulin.isf() {
            Some(isf) => println!(
                "  Estimated ISF: 1 unit lowers glucose by ~{:.1} mg/dL",
                isf
            ),
            None => println!(
                "  ISF: not applicable for {:?} insulin",
                insulin.insulin_type
            ),
        }
    }
    display_recommendations(&advice);
    Ok(())
}

fn cmd_cgm(config: &Config, args: CgmArgs) -> Result<()> {
    let defaults = SynthesisParams::from(&config.cgm);
    let params = SynthesisParams {
        num_days: args.num_days.unwrap_or(defaults.num_days),
        readings_per_day: args.readings_per_day.unwrap_or(defaults.readings_per_day),
        baseline: args.baseline.unwrap_or(defaults.baseline),
        variability: args.variability.unwrap_or(defaults.variability),
        meal_amplitude: args.meal_amplitude.unwrap_or(defaults.meal_amplitude),
        exercise_amplitude: args
            .exercise_amplitude
            .unwrap_or(defaults.exercise_amplitude),
    };

    let (trajectory, metrics) = run_cgm_synthesis(&params, args.seed)?;

    if let Some(path) = export_path(args.csv, args.export, config, "simulated_cgm.csv") {
        export_trajectory(&trajectory, &path)?;
        println!("Trajectory written to {}", path.display());
    }

    let advice = recommendations(&metrics, None);
    if args.json {
        let report = Report {
            metrics: &metrics,
            daily_calorie_target: None,
            recommendations: &advice,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_metrics("CGM SYNTHESIS", &metrics);
    println!("  Samples: {}", trajectory.len());
    display_recommendations(&advice);
    Ok(())
}

fn cmd_analyze(file: &PathBuf, json: bool) -> Result<()> {
    tracing::info!("Analyzing CGM upload {:?}", file);
    let trajectory = ingest_cgm_csv(file)?;
    let metrics = derive_metrics(&trajectory)?;
    let advice = recommendations(&metrics, None);

    if json {
        let report = Report {
            metrics: &metrics,
            daily_calorie_target: None,
            recommendations: &advice,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_metrics("CGM ANALYSIS", &metrics);
    println!("  Samples: {}", trajectory.len());
    display_recommendations(&advice);
    Ok(())
}

fn cmd_meds(catalog: &MedicationCatalog, diagnosis: &str) -> Result<()> {
    let diagnosis = parse_diagnosis(diagnosis)?;

    println!("Glucose-lowering medications ({:?}):", diagnosis);
    let mut glucose_lowering: Vec<_> = catalog.glucose_lowering(diagnosis).values().collect();
    glucose_lowering.sort_by(|a, b| a.drug_id.cmp(&b.drug_id));
    for entry in glucose_lowering {
        println!(
            "  {:<32} {}  (effectiveness {:.2}, max {} mg/day)",
            entry.drug_id, entry.display_name, entry.effectiveness_coefficient, entry.max_dose_mg
        );
    }

    println!("\nOther medications:");
    let mut secondary: Vec<_> = catalog.secondary.values().collect();
    secondary.sort_by_key(|e| (format!("{:?}", e.category), e.drug_id.clone()));
    for entry in secondary {
        println!(
            "  {:<32} {}  ({:?}, +{} mg/dL, max {} mg/day)",
            entry.drug_id,
            entry.display_name,
            entry.category,
            entry.fixed_glucose_delta,
            entry.max_dose_mg
        );
    }
    Ok(())
}

fn export_path(
    csv: Option<PathBuf>,
    export: bool,
    config: &Config,
    default_name: &str,
) -> Option<PathBuf> {
    csv.or_else(|| {
        if export {
            Some(config.data.export_dir.join(default_name))
        } else {
            None
        }
    })
}

fn display_metrics(title: &str, metrics: &SimulationMetrics) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Average Glucose:    {:.1} mg/dL", metrics.average_glucose);
    println!("  Estimated HbA1c:    {:.2}%", metrics.estimated_hba1c);
    println!("  Time in Range:      {:.1}%", metrics.time_in_range_pct);
    println!("  Hypoglycemia:       {:.1}%", metrics.hypoglycemia_pct);
    println!("  Hyperglycemia:      {:.1}%", metrics.hyperglycemia_pct);
    println!(
        "  Fasting Estimate:   {:.1} mg/dL",
        metrics.fasting_glucose_estimate
    );
    println!(
        "  Post-Meal Estimate: {:.1} mg/dL",
        metrics.post_meal_glucose_estimate
    );
    println!();
}

fn display_recommendations(advice: &[String]) {
    println!("  Recommendations:");
    for line in advice {
        println!("  → {}", line);
    }
    println!();
}

fn parse_medication(raw: &str) -> Result<MedicationDose> {
    let (drug_id, dose) = raw.split_once(':').ok_or_else(|| {
        Error::InvalidInput(format!(
            "medication '{}' must be in DRUG_ID:DOSE_MG form",
            raw
        ))
    })?;
    let dose_mg = dose.trim().parse::<f64>().map_err(|_| {
        Error::InvalidInput(format!("invalid dose '{}' for '{}'", dose, drug_id))
    })?;
    Ok(MedicationDose {
        drug_id: drug_id.trim().to_string(),
        dose_mg,
    })
}

fn parse_diagnosis(raw: &str) -> Result<Diagnosis> {
    match raw.to_lowercase().as_str() {
        "non-diabetic" | "non_diabetic" | "none" => Ok(Diagnosis::NonDiabetic),
        "pre-diabetic" | "pre_diabetic" | "pre" => Ok(Diagnosis::PreDiabetic),
        "diabetic" => Ok(Diagnosis::Diabetic),
        other => Err(Error::InvalidInput(format!("unknown diagnosis '{}'", other))),
    }
}

fn parse_sex(raw: &str) -> Result<Sex> {
    match raw.to_lowercase().as_str() {
        "male" => Ok(Sex::Male),
        "female" => Ok(Sex::Female),
        "other" => Ok(Sex::Other),
        other => Err(Error::InvalidInput(format!("unknown sex '{}'", other))),
    }
}

fn parse_activity(raw: &str) -> Result<ActivityLevel> {
    match raw.to_lowercase().as_str() {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "light" | "lightly-active" => Ok(ActivityLevel::LightlyActive),
        "moderate" | "moderately-active" => Ok(ActivityLevel::ModeratelyActive),
        "very-active" => Ok(ActivityLevel::VeryActive),
        "athlete" => Ok(ActivityLevel::Athlete),
        other => Err(Error::InvalidInput(format!(
            "unknown activity level '{}'",
            other
        ))),
    }
}

fn parse_insulin_type(raw: &str) -> Result<InsulinType> {
    match raw.to_lowercase().as_str() {
        "rapid" | "rapid-acting" => Ok(InsulinType::RapidActing),
        "short" | "short-acting" | "regular" => Ok(InsulinType::ShortActing),
        "intermediate" | "intermediate-acting" => Ok(InsulinType::IntermediateActing),
        "long" | "long-acting" => Ok(InsulinType::LongActing),
        other => Err(Error::InvalidInput(format!(
            "unknown insulin type '{}'",
            other
        ))),
    }
}
