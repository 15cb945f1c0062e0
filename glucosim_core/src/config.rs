//! Configuration file support for Glucosim.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/glucosim/config.toml`.

use crate::types::SynthesisParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub cgm: CgmConfig,
}

/// Data export configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}

/// Daily simulation defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
        }
    }
}

/// CGM synthesis defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CgmConfig {
    #[serde(default = "default_num_days")]
    pub num_days: u32,

    #[serde(default = "default_readings_per_day")]
    pub readings_per_day: u32,

    #[serde(default = "default_baseline")]
    pub baseline: f64,

    #[serde(default = "default_variability")]
    pub variability: f64,

    #[serde(default = "default_meal_amplitude")]
    pub meal_amplitude: f64,

    #[serde(default = "default_exercise_amplitude")]
    pub exercise_amplitude: f64,
}

impl Default for CgmConfig {
    fn default() -> Self {
        Self {
            num_days: default_num_days(),
            readings_per_day: default_readings_per_day(),
            baseline: default_baseline(),
            variability: default_variability(),
            meal_amplitude: default_meal_amplitude(),
            exercise_amplitude: default_exercise_amplitude(),
        }
    }
}

impl From<&CgmConfig> for SynthesisParams {
    fn from(config: &CgmConfig) -> Self {
        SynthesisParams {
            num_days: config.num_days,
            readings_per_day: config.readings_per_day,
            baseline: config.baseline,
            variability: config.variability,
            meal_amplitude: config.meal_amplitude,
            exercise_amplitude: config.exercise_amplitude,
        }
    }
}

// Default value functions
fn default_export_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("glucosim")
}

fn default_sample_count() -> usize {
    7
}

fn default_num_days() -> u32 {
    7
}

fn default_readings_per_day() -> u32 {
    96
}

fn default_baseline() -> f64 {
    110.0
}

fn default_variability() -> f64 {
    15.0
}

fn default_meal_amplitude() -> f64 {
    40.0
}

fn default_exercise_amplitude() -> f64 {
    25.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("glucosim").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.simulation.sample_count, 7);
        assert_eq!(config.cgm.readings_per_day, 96);
        assert_eq!(config.cgm.baseline, 110.0);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.simulation.sample_count, parsed.simulation.sample_count);
        assert_eq!(config.cgm.meal_amplitude, parsed.cgm.meal_amplitude);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[cgm]
variability = 25.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cgm.variability, 25.0);
        assert_eq!(config.cgm.num_days, 7); // default
        assert_eq!(config.simulation.sample_count, 7); // default
    }

    #[test]
    fn test_cgm_config_to_synthesis_params() {
        let config = CgmConfig::default();
        let params = SynthesisParams::from(&config);
        assert_eq!(params.num_days, 7);
        assert_eq!(params.exercise_amplitude, 25.0);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.cgm.baseline = 120.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cgm.baseline, 120.0);
    }
}
