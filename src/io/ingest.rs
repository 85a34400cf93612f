//! CSV ingest of price history.
//!
//! Expected columns (header names are case-insensitive, extra columns ignored):
//!
//! ```text
//! date,commodity,price
//! 2023-01-01,Onion,24.5
//! ```
//!
//! Rows are grouped by commodity, matching names case-insensitively. Dates and
//! prices stay as text here; cleaning them is the job of series preparation.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CommodityHistory, RawPriceRow};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 3] = ["date", "commodity", "price"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: histories in order of first appearance + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedHistory {
    pub histories: Vec<CommodityHistory>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedHistory {
    /// History of `commodity`, matched case-insensitively.
    pub fn find(&self, commodity: &str) -> Option<&CommodityHistory> {
        let key = commodity_key(commodity);
        self.histories.iter().find(|h| commodity_key(&h.commodity) == key)
    }

    pub fn commodity_names(&self) -> Vec<&str> {
        self.histories.iter().map(|h| h.commodity.as_str()).collect()
    }
}

/// Load price history from a CSV file.
pub fn load_price_history(path: &Path) -> Result<IngestedHistory, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_price_history(file)?;

    if !ingested.row_errors.is_empty() {
        tracing::warn!(
            path = %path.display(),
            errors = ingested.row_errors.len(),
            "skipped malformed CSV rows"
        );
    }
    Ok(ingested)
}

/// Read price history from any CSV source.
pub fn read_price_history<R: Read>(source: R) -> Result<IngestedHistory, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }

    let mut out = IngestedHistory::default();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(commodity) = get_value(&record, &header_map, "commodity") else {
            out.row_errors.push(RowError {
                line,
                message: "Missing required value: `commodity`".to_string(),
            });
            continue;
        };

        let row = RawPriceRow::new(
            get_value(&record, &header_map, "date").unwrap_or_default(),
            get_value(&record, &header_map, "price").unwrap_or_default(),
        );

        let slot = *index_by_key.entry(commodity_key(commodity)).or_insert_with(|| {
            out.histories.push(CommodityHistory {
                commodity: commodity.to_string(),
                rows: Vec::new(),
            });
            out.histories.len() - 1
        });
        out.histories[slot].rows.push(row);
    }

    if out.histories.is_empty() {
        return Err(AppError::new(3, "No usable price rows in the CSV input."));
    }

    Ok(out)
}

fn commodity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_value<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn groups_commodities_case_insensitively() {
        let csv = "\u{feff}Date,Commodity,Price,Market\n\
                   2023-01-01,Onion,24.5,Delhi\n\
                   2023-01-01,Wheat,22,Delhi\n\
                   2023-02-01,ONION,26,Delhi\n\
                   2023-03-01, onion ,n/a,Delhi\n";
        let ingested = read_price_history(csv.as_bytes()).unwrap();

        assert_eq!(ingested.rows_read, 4);
        assert_eq!(ingested.commodity_names(), vec!["Onion", "Wheat"]);

        let onion = ingested.find("oNiOn").unwrap();
        assert_eq!(onion.rows.len(), 3);
        assert_eq!(onion.rows[1], RawPriceRow::new("2023-02-01", "26"));
        // Price cleaning happens later; the raw text is kept.
        assert_eq!(onion.rows[2].price, "n/a");
    }

    #[test]
    fn rows_without_commodity_are_reported() {
        let csv = "date,commodity,price\n2023-01-01,,10\n2023-02-01,Tea Loose,300\n";
        let ingested = read_price_history(csv.as_bytes()).unwrap();
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 2);
        assert_eq!(ingested.histories.len(), 1);
    }

    #[test]
    fn missing_column_is_a_usage_error() {
        let err = read_price_history("date,price\n2023-01-01,10\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("commodity"));
    }

    #[test]
    fn empty_input_has_nothing_to_forecast() {
        let err = read_price_history("date,commodity,price\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,commodity,price").unwrap();
        for m in 1..=3 {
            writeln!(file, "2022-{m:02}-01,Mustard Oil,{}", 150 + m).unwrap();
        }
        file.flush().unwrap();

        let ingested = load_price_history(file.path()).unwrap();
        assert_eq!(ingested.find("mustard oil").unwrap().rows.len(), 3);

        let missing = load_price_history(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);
    }
}
