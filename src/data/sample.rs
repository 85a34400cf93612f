//! Synthetic monthly price history.
//!
//! Used by `cropcast demo` and by tests that need realistic-looking input without
//! a dataset on disk. Prices follow a compound trend, a mild version of the
//! category's seasonal regime, and log-normal noise:
//!
//! ```text
//! price_t = base · (1 + g)^(t/12) · season(month_t) · exp(σ z_t − σ²/2)
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::category::{ProfileTable, classify};
use crate::domain::RawPriceRow;
use crate::error::ForecastError;

/// Share of the profile's seasonal swing reproduced in the synthetic history.
const SEASONAL_DAMPING: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub commodity: String,
    /// First observation date; later rows are one calendar month apart.
    pub start: NaiveDate,
    pub months: usize,
    pub base_price: f64,
    pub annual_growth: f64,
    /// Log-scale noise standard deviation.
    pub noise_sd: f64,
    pub seed: u64,
}

/// Generate `spec.months` monthly rows.
pub fn generate_history(spec: &SampleSpec, profiles: &ProfileTable) -> Result<Vec<RawPriceRow>, ForecastError> {
    if spec.months == 0 {
        return Err(ForecastError::Validation("Sample month count must be > 0.".to_string()));
    }
    if !(spec.base_price.is_finite() && spec.base_price > 0.0) {
        return Err(ForecastError::Validation("Sample base price must be > 0.".to_string()));
    }
    if !(spec.annual_growth.is_finite() && spec.annual_growth > -1.0) {
        return Err(ForecastError::Validation("Sample growth must be > -100%.".to_string()));
    }

    let normal = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| ForecastError::Validation(format!("Noise distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(commodity_seed(spec.seed, &spec.commodity));

    let regime = profiles.regime(classify(&spec.commodity), &spec.commodity);
    let drift = -0.5 * spec.noise_sd * spec.noise_sd;

    let mut rows = Vec::with_capacity(spec.months);
    for t in 0..spec.months {
        let date = spec
            .start
            .checked_add_months(Months::new(t as u32))
            .ok_or_else(|| ForecastError::Validation("Sample date range overflows the calendar.".to_string()))?;

        let trend = (1.0 + spec.annual_growth).powf(t as f64 / 12.0);
        let season = 1.0 + SEASONAL_DAMPING * (regime.monthly_factor(date.month(), 0.0) - 1.0);
        let noise = (normal.sample(&mut rng) + drift).exp();

        let price = spec.base_price * trend * season * noise;
        rows.push(RawPriceRow::new(date.format("%Y-%m-%d").to_string(), format!("{price:.2}")));
    }

    Ok(rows)
}

/// Seed for one commodity derived from a base seed.
///
/// Stable within a build; commodities with different names get independent streams.
pub fn commodity_seed(seed: u64, commodity: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    commodity.to_lowercase().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(seed: u64) -> SampleSpec {
        SampleSpec {
            commodity: "Onion".to_string(),
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            months: 36,
            base_price: 30.0,
            annual_growth: 0.05,
            noise_sd: 0.05,
            seed,
        }
    }

    #[test]
    fn same_seed_same_history() {
        let profiles = ProfileTable::builtin();
        let a = generate_history(&spec(7), &profiles).unwrap();
        let b = generate_history(&spec(7), &profiles).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(a[0].date, "2021-01-01");
        assert_eq!(a[35].date, "2023-12-01");
    }

    #[test]
    fn different_seeds_differ() {
        let profiles = ProfileTable::builtin();
        let a = generate_history(&spec(1), &profiles).unwrap();
        let b = generate_history(&spec(2), &profiles).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prices_are_positive_numbers() {
        let rows = generate_history(&spec(3), &ProfileTable::builtin()).unwrap();
        for row in rows {
            let p: f64 = row.price.parse().unwrap();
            assert!(p > 0.0);
        }
    }

    #[test]
    fn rejects_empty_history() {
        let mut s = spec(1);
        s.months = 0;
        assert!(generate_history(&s, &ProfileTable::builtin()).is_err());
    }

    #[test]
    fn commodity_seed_is_case_insensitive() {
        assert_eq!(commodity_seed(42, "Onion"), commodity_seed(42, "ONION"));
        assert_ne!(commodity_seed(42, "Onion"), commodity_seed(42, "Potato"));
    }
}
