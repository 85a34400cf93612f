//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages in-memory
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A raw history row as supplied by the data-access side.
///
/// Both fields are kept as text: cleaning (date parsing, numeric coercion) is the
/// job of series preparation, not of whoever hands us the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPriceRow {
    pub date: String,
    pub price: String,
}

impl RawPriceRow {
    pub fn new(date: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            price: price.into(),
        }
    }
}

/// All raw rows of one commodity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityHistory {
    /// Name as first seen in the input.
    pub commodity: String,
    pub rows: Vec<RawPriceRow>,
}

/// A cleaned observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub commodity: String,
    /// Always finite and `> 0`.
    pub price: f64,
}

/// One yearly bucket: year-end date and the mean price of that year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Yearly resampled series without gaps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YearlySeries {
    pub points: Vec<YearlyPoint>,
}

impl YearlySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first(&self) -> Option<&YearlyPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&YearlyPoint> {
        self.points.last()
    }
}

/// Commodity category; each has its own seasonal/growth profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vegetables,
    Pulses,
    Oils,
    Cereals,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Vegetables,
        Category::Pulses,
        Category::Oils,
        Category::Cereals,
        Category::Others,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Vegetables => "vegetables",
            Category::Pulses => "pulses",
            Category::Oils => "oils",
            Category::Cereals => "cereals",
            Category::Others => "others",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single forecast value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Non-negative, rounded to 2 decimals.
    pub price: f64,
}

impl ForecastPoint {
    /// Build a point, rounding the price to cents.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            price: round2(price),
        }
    }
}

/// Final output of one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub commodity: String,
    pub category: Category,
    /// Five points, one per year after the last observed year.
    pub yearly: Vec<ForecastPoint>,
    /// Sixty points, one per month after the last observed date.
    pub monthly: Vec<ForecastPoint>,
}

/// Portable JSON representation of one or more forecasts.
///
/// Written by `forecast --export-json`, read back by `plot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub forecasts: Vec<ForecastRecord>,
}

/// A forecast together with the yearly history it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    #[serde(flatten)]
    pub result: ForecastResult,
    pub history: Vec<YearlyPoint>,
    pub growth: f64,
    pub model: String,
}

/// Round to 2 decimal places (half away from zero).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Last calendar day of `year-month`.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// Month-end date `k` months after the month containing `date`.
pub fn month_end_after(date: NaiveDate, k: u32) -> Option<NaiveDate> {
    let idx = date.year() as i64 * 12 + (date.month0() as i64) + k as i64;
    let year = i32::try_from(idx.div_euclid(12)).ok()?;
    let month = (idx.rem_euclid(12) + 1) as u32;
    month_end(year, month)
}
