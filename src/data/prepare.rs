//! Series preparation: raw rows → cleaned observations → gap-free yearly series.
//!
//! Cleaning order matters and is fixed:
//!
//! 1. parse dates (unparseable rows are dropped)
//! 2. drop duplicate dates, keeping the first occurrence in input order
//! 3. sort by date
//! 4. coerce prices, dropping non-numeric / non-finite / non-positive values
//! 5. resample to yearly means and fill missing years (forward, then backward)
//!
//! Because duplicates are removed *before* price coercion, a duplicate date whose
//! first occurrence carries a bad price is dropped entirely.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use statrs::statistics::Statistics;

use crate::domain::{PricePoint, RawPriceRow, YearlyPoint, YearlySeries};
use crate::error::ForecastError;
use crate::math::forward_back_fill;

/// At least one year of monthly observations is needed to forecast.
pub const MIN_HISTORY_ROWS: usize = 12;

/// A row dropped during cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// Zero-based position in the input rows.
    pub index: usize,
    pub reason: String,
}

/// Cleaned history of one commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    pub commodity: String,
    /// Cleaned observations, ascending by date, unique dates.
    pub points: Vec<PricePoint>,
    pub yearly: YearlySeries,
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
}

impl PreparedSeries {
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Coefficient of variation of the cleaned prices.
    pub fn volatility(&self) -> f64 {
        historical_volatility(&self.prices())
    }
}

/// Clean and resample the raw history of one commodity.
pub fn prepare_series(commodity: &str, rows: &[RawPriceRow]) -> Result<PreparedSeries, ForecastError> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut dated = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let Some(date) = parse_date(&row.date) else {
            issues.push(RowIssue {
                index,
                reason: format!("invalid date '{}'", row.date),
            });
            continue;
        };
        if !seen.insert(date) {
            issues.push(RowIssue {
                index,
                reason: format!("duplicate date {date}"),
            });
            continue;
        }
        dated.push((index, date, row.price.as_str()));
    }

    dated.sort_by_key(|&(_, date, _)| date);

    let mut points = Vec::with_capacity(dated.len());
    for (index, date, raw_price) in dated {
        match parse_price(raw_price) {
            Some(price) => points.push(PricePoint {
                date,
                commodity: commodity.to_string(),
                price,
            }),
            None => issues.push(RowIssue {
                index,
                reason: format!("invalid price '{raw_price}'"),
            }),
        }
    }

    if !issues.is_empty() {
        tracing::warn!(commodity, dropped = issues.len(), "dropped rows during cleaning");
    }

    if points.len() < MIN_HISTORY_ROWS {
        return Err(ForecastError::InsufficientData {
            commodity: commodity.to_string(),
            found: points.len(),
            required: MIN_HISTORY_ROWS,
        });
    }

    issues.sort_by_key(|issue| issue.index);
    let yearly = resample_yearly(&points);

    Ok(PreparedSeries {
        commodity: commodity.to_string(),
        points,
        yearly,
        issues,
        rows_read: rows.len(),
    })
}

/// Yearly means labelled by year-end, with missing years filled.
///
/// Points must be sorted by date.
pub fn resample_yearly(points: &[PricePoint]) -> YearlySeries {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return YearlySeries::default();
    };

    let mut buckets: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for p in points {
        let entry = buckets.entry(p.date.year()).or_insert((0.0, 0));
        entry.0 += p.price;
        entry.1 += 1;
    }

    let years: Vec<i32> = (first.date.year()..=last.date.year()).collect();
    let mut means: Vec<f64> = years
        .iter()
        .map(|y| match buckets.get(y) {
            Some(&(sum, count)) if count > 0 => sum / count as f64,
            _ => f64::NAN,
        })
        .collect();
    forward_back_fill(&mut means);

    let points = years
        .iter()
        .zip(means)
        .filter_map(|(&year, price)| {
            NaiveDate::from_ymd_opt(year, 12, 31).map(|date| YearlyPoint { date, price })
        })
        .collect();

    YearlySeries { points }
}

/// Sample standard deviation divided by the mean.
///
/// Returns 0 when the ratio is undefined (fewer than two prices, zero mean).
pub fn historical_volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let mean: f64 = prices.iter().mean();
    let std_dev: f64 = prices.iter().std_dev();
    let vol = std_dev / mean;
    if vol.is_finite() { vol } else { 0.0 }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // Timestamps exported by databases (`2021-03-01 00:00:00`, `2021-03-01T00:00:00`).
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn parse_price(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() && v > 0.0 { Some(v) } else { None }
}
