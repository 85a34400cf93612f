//! Export forecasts to CSV.
//!
//! One row per forecast point, meant to be easy to consume in spreadsheets or
//! downstream scripts:
//!
//! ```text
//! commodity,category,series,date,price
//! Onion,vegetables,yearly,2024-12-31,31.40
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ForecastResult;
use crate::error::AppError;

/// Write yearly and monthly points of every result to a CSV file.
pub fn write_forecast_csv(path: &Path, results: &[&ForecastResult]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_forecast_rows(&mut file, results)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_forecast_rows<W: Write>(out: &mut W, results: &[&ForecastResult]) -> std::io::Result<()> {
    writeln!(out, "commodity,category,series,date,price")?;
    for result in results {
        let commodity = csv_field(&result.commodity);
        for (series, points) in [("yearly", &result.yearly), ("monthly", &result.monthly)] {
            for p in points.iter() {
                writeln!(out, "{commodity},{},{series},{},{:.2}", result.category, p.date, p.price)?;
            }
        }
    }
    Ok(())
}

/// Quote a field if it would break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ForecastPoint, month_end};

    fn result() -> ForecastResult {
        ForecastResult {
            commodity: "Salt Pack (Iodised)".to_string(),
            category: Category::Others,
            yearly: vec![ForecastPoint::new(month_end(2024, 12).unwrap(), 21.456)],
            monthly: vec![
                ForecastPoint::new(month_end(2024, 1).unwrap(), 20.1),
                ForecastPoint::new(month_end(2024, 2).unwrap(), 20.2),
            ],
        }
    }

    #[test]
    fn rows_cover_both_series() {
        let mut buf = Vec::new();
        write_forecast_rows(&mut buf, &[&result()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "Salt Pack (Iodised),others,yearly,2024-12-31,21.46");
        assert_eq!(lines[3], "Salt Pack (Iodised),others,monthly,2024-02-29,20.20");
    }

    #[test]
    fn commas_are_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_forecast_csv(&path, &[&result()]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("commodity,category,series,date,price\n"));
    }
}
