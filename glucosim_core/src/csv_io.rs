//! CSV export and ingestion for glucose trajectories.
//!
//! The download contract is a two-column table with header
//! `Timestamp,Glucose (mg/dL)` and minute-resolution timestamps. The
//! upload contract accepts any two-column table whose second column is
//! numeric glucose; non-numeric rows are dropped rather than failing the
//! whole import.

use crate::types::{GlucoseTrajectory, TrajectoryPoint};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Timestamp format used in exported CSVs
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Glucose (mg/dL)")]
    glucose: String,
}

impl CsvRow {
    fn from_point(trajectory: &GlucoseTrajectory, point: &TrajectoryPoint) -> Self {
        CsvRow {
            timestamp: trajectory
                .timestamp_of(point)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            glucose: format!("{:.2}", point.glucose_mg_dl),
        }
    }
}

/// Write a trajectory to a CSV file, one row per sample
pub fn export_trajectory(trajectory: &GlucoseTrajectory, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for point in &trajectory.points {
        writer.serialize(CsvRow::from_point(trajectory, point))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} samples to {:?}", trajectory.len(), path);
    Ok(())
}

/// Best-effort timestamp parsing for uploaded data
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read an uploaded CGM CSV into a trajectory.
///
/// Column 0 is a timestamp, column 1 a numeric glucose value in mg/dL.
/// Rows with non-numeric glucose are dropped. Fails with `MalformedInput`
/// if fewer than two columns are present.
///
/// Offsets are kept in one unit per trajectory: when any timestamp in the
/// file parses, offsets are minutes from the first parsed timestamp and
/// rows with unparseable timestamps are dropped; only when no timestamp
/// parses at all do offsets fall back to row indices.
pub fn ingest_cgm_csv(path: &Path) -> Result<GlucoseTrajectory> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::MalformedInput(format!(
            "expected at least 2 columns (timestamp, glucose), found {}",
            headers.len()
        )));
    }

    let mut rows: Vec<(Option<DateTime<Utc>>, f64)> = Vec::new();
    let mut dropped_glucose = 0usize;

    for record in reader.records() {
        let record = record?;
        let glucose = record
            .get(1)
            .and_then(|raw| raw.trim().parse::<f64>().ok());
        let glucose = match glucose {
            Some(value) => value,
            None => {
                dropped_glucose += 1;
                continue;
            }
        };
        rows.push((record.get(0).and_then(parse_timestamp), glucose));
    }

    if dropped_glucose > 0 {
        tracing::warn!(
            "Dropped {} rows with non-numeric glucose values",
            dropped_glucose
        );
    }

    let start = rows.iter().find_map(|(timestamp, _)| *timestamp);

    let points = match start {
        Some(first) => {
            let mut dropped_timestamps = 0usize;
            let points: Vec<TrajectoryPoint> = rows
                .iter()
                .filter_map(|(timestamp, glucose)| match timestamp {
                    Some(ts) => Some(TrajectoryPoint {
                        offset_minutes: (*ts - first).num_minutes(),
                        glucose_mg_dl: *glucose,
                    }),
                    None => {
                        dropped_timestamps += 1;
                        None
                    }
                })
                .collect();
            if dropped_timestamps > 0 {
                tracing::warn!(
                    "Dropped {} rows with unparseable timestamps",
                    dropped_timestamps
                );
            }
            points
        }
        None => rows
            .iter()
            .enumerate()
            .map(|(index, (_, glucose))| TrajectoryPoint {
                offset_minutes: index as i64,
                glucose_mg_dl: *glucose,
            })
            .collect(),
    };

    Ok(GlucoseTrajectory {
        start: start.unwrap_or_else(Utc::now),
        points,
    })
}
