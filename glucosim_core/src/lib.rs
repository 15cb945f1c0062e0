#![forbid(unsafe_code)]

//! Core domain model and simulation logic for the Glucosim engine.
//!
//! This crate provides:
//! - Domain types (parameter sets, trajectories, metrics)
//! - Medication catalog
//! - Effect resolvers (medications, lifestyle, hormonal, diet)
//! - Daily trajectory generation and CGM synthesis
//! - Metric derivation and recommendations
//! - CSV import/export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod resolvers;
pub mod engine;
pub mod metrics;
pub mod cgm;
pub mod csv_io;
pub mod advice;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, default_catalog, MedicationCatalog};
pub use config::Config;
pub use engine::{compute_adjusted_glucose, run_daily_simulation, DEFAULT_SAMPLE_COUNT};
pub use metrics::derive_metrics;
pub use cgm::run_cgm_synthesis;
pub use csv_io::{export_trajectory, ingest_cgm_csv};
pub use advice::recommendations;
