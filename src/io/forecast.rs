//! Read/write forecast JSON files.
//!
//! Forecast JSON is the portable representation of a run:
//! - commodity, category and model label
//! - the yearly history the model saw
//! - the 5 yearly and 60 monthly forecast points
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use crate::app::pipeline::ForecastRun;
use crate::domain::{ForecastFile, ForecastRecord};
use crate::error::AppError;

impl ForecastRecord {
    pub fn from_run(run: &ForecastRun) -> Self {
        Self {
            result: run.result.clone(),
            history: run.series.yearly.points.clone(),
            growth: run.growth,
            model: run.model.clone(),
        }
    }
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, runs: &[&ForecastRun]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    let doc = ForecastFile {
        tool: "cropcast".to_string(),
        forecasts: runs.iter().map(|run| ForecastRecord::from_run(run)).collect(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let doc: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    if doc.forecasts.is_empty() {
        return Err(AppError::new(2, format!("Forecast JSON '{}' holds no forecasts.", path.display())));
    }
    Ok(doc)
}
