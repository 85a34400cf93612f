//! Seasonal reshaping of the raw yearly forecast.
//!
//! Each step is clipped into a growth window anchored on the previous adjusted
//! price, so the adjustment is a left fold over the five raw values:
//!
//! ```text
//! factor  = regime factor for the projected month
//! lower   = current · (1 + g)  · factor
//! upper   = current · (1 + 2g) · factor
//! price   = clip(raw · factor, lower, upper)
//! current = price
//! ```

use chrono::{Datelike, Months};

use crate::category::SeasonalRegime;
use crate::domain::{ForecastPoint, YearlyPoint};
use crate::error::ForecastError;

/// One adjusted yearly step with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedYear {
    pub point: ForecastPoint,
    /// Model output before adjustment.
    pub raw: f64,
    /// Month used to select the seasonal regime (0 selects nothing).
    pub month: u32,
    pub seasonal_factor: f64,
    pub lower: f64,
    pub upper: f64,
    /// The clipped value was not finite and got replaced.
    pub substituted: bool,
}

/// Month driving the regime lookup for step `step` (0-based).
///
/// Yearly labels sit on 31 December, so this yields 0, 1, 2, ... and month 0 never
/// matches a peak or harvest set.
pub fn projected_month(last_month: u32, step: usize) -> u32 {
    ((last_month as usize + step) % 12) as u32
}

/// Admissible range `(lower, upper)` for the next adjusted price.
///
/// Negative growth puts `1 + 2g` below `1 + g`; the ends are ordered either way.
pub fn bound_window(current: f64, growth: f64, factor: f64) -> (f64, f64) {
    let a = current * (1.0 + growth) * factor;
    let b = current * (1.0 + 2.0 * growth) * factor;
    (a.min(b), a.max(b))
}

/// Adjust `raw` yearly forecasts that follow `last`.
pub fn adjust_yearly(
    raw: &[f64],
    last: &YearlyPoint,
    growth: f64,
    volatility: f64,
    regime: &SeasonalRegime,
) -> Result<Vec<AdjustedYear>, ForecastError> {
    let fallback = last.price * (1.0 + growth);
    let mut current = last.price;
    let mut out = Vec::with_capacity(raw.len());

    for (step, &value) in raw.iter().enumerate() {
        let month = projected_month(last.date.month(), step);
        let factor = regime.yearly_factor(month, volatility);
        let (lower, upper) = bound_window(current, growth, factor);

        // f64::max drops NaN, which would silently pin a missing value to the lower bound.
        let scaled = value * factor;
        let clipped = if scaled.is_nan() {
            f64::NAN
        } else {
            scaled.max(lower).min(upper).max(0.0)
        };
        let substituted = !clipped.is_finite();
        let price = if substituted {
            tracing::warn!(step, raw = value, fallback, "non-finite adjusted price; substituting growth projection");
            fallback
        } else {
            clipped
        };

        let date = last
            .date
            .checked_add_months(Months::new(12 * (step as u32 + 1)))
            .ok_or_else(|| ForecastError::Validation(format!("Forecast date overflows after {}", last.date)))?;

        out.push(AdjustedYear {
            point: ForecastPoint::new(date, price),
            raw: value,
            month,
            seasonal_factor: factor,
            lower,
            upper,
            substituted,
        });
        current = price;
    }

    Ok(out)
}
