//! Monthly forecast from the adjusted yearly points.
//!
//! The last observed yearly price and the five adjusted yearly points are joined
//! by a natural cubic spline (x = days since the last observation), sampled at
//! the 60 following month-ends, then perturbed:
//!
//! ```text
//! monthly_t = spline(t) · u_t · season(month_t),   u_t ~ U[vol_lo, vol_hi]
//! ```
//!
//! and floored at `last_price · min_threshold`.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::category::{CategoryProfile, SeasonalRegime};
use crate::domain::{ForecastPoint, YearlyPoint, month_end_after};
use crate::error::ForecastError;
use crate::math::{NaturalCubicSpline, forward_back_fill};

/// Interpolate `months` month-end prices after `last`.
///
/// `yearly` must be the adjusted points in date order; `volatility` is the
/// historical volatility of the cleaned series.
pub fn interpolate_monthly<R: Rng + ?Sized>(
    last: &YearlyPoint,
    yearly: &[ForecastPoint],
    months: u32,
    regime: &SeasonalRegime,
    profile: &CategoryProfile,
    volatility: f64,
    rng: &mut R,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let first_yearly = yearly
        .first()
        .map(|p| p.price)
        .ok_or_else(|| ForecastError::Validation("No yearly points to interpolate.".to_string()))?;

    let offset = |d: NaiveDate| (d - last.date).num_days() as f64;
    let mut xs = vec![0.0];
    let mut ys = vec![last.price];
    for p in yearly {
        xs.push(offset(p.date));
        ys.push(p.price);
    }
    let spline = NaturalCubicSpline::new(&xs, &ys);
    if spline.is_none() {
        tracing::warn!(knots = xs.len(), "cannot build spline through yearly points; monthly values fall back");
    }

    let dates = (1..=months)
        .map(|k| {
            month_end_after(last.date, k)
                .ok_or_else(|| ForecastError::Validation(format!("Monthly date overflows after {}", last.date)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (vol_lo, vol_hi) = profile.volatility_range;
    let floor = last.price * profile.min_threshold;

    let mut values: Vec<f64> = dates
        .iter()
        .map(|&date| {
            // One draw per month keeps the random stream independent of spline failures.
            let variation = if vol_lo < vol_hi { rng.gen_range(vol_lo..=vol_hi) } else { vol_lo };
            let base = spline.as_ref().and_then(|s| s.eval(offset(date))).unwrap_or(f64::NAN);
            let value = base * variation * regime.monthly_factor(date.month(), volatility);
            if value.is_nan() { value } else { value.max(floor) }
        })
        .collect();

    forward_back_fill(&mut values);

    let mut replaced = 0usize;
    let points = dates
        .into_iter()
        .zip(values)
        .map(|(date, v)| {
            let price = if v.is_finite() {
                v
            } else {
                replaced += 1;
                first_yearly
            };
            ForecastPoint::new(date, price)
        })
        .collect();
    if replaced > 0 {
        tracing::warn!(replaced, first_yearly, "non-finite monthly values replaced by the first yearly price");
    }

    Ok(points)
}
