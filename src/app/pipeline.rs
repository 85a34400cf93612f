//! Shared forecast pipeline used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! prepare -> classify -> growth -> SARIMA -> seasonal adjustment -> monthly interpolation
//!
//! The subcommands can then focus on presentation (printing vs exporting).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::adjust::{AdjustedYear, adjust_yearly, interpolate_monthly};
use crate::category::{ProfileTable, classify, known_category};
use crate::data::{PreparedSeries, commodity_seed, prepare_series};
use crate::domain::{Category, CommodityHistory, ForecastPoint, ForecastResult, RawPriceRow};
use crate::error::ForecastError;
use crate::fit::{ModelForecast, estimate_growth, fit_sarima};
use crate::models::SarimaOrder;

pub const FORECAST_YEARS: usize = 5;
pub const FORECAST_MONTHS: u32 = 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastOptions {
    /// Reject commodities that are not in any category list.
    pub strict_category: bool,
}

/// Everything computed for one commodity.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub result: ForecastResult,
    pub series: PreparedSeries,
    pub growth: f64,
    pub volatility: f64,
    pub model: String,
    pub model_forecast: ModelForecast,
    pub adjustments: Vec<AdjustedYear>,
}

/// Outcome of one commodity inside a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub commodity: String,
    pub outcome: Result<ForecastRun, ForecastError>,
}

/// Forecast one commodity from its raw history.
pub fn run_forecast<R: Rng + ?Sized>(
    commodity: &str,
    rows: &[RawPriceRow],
    profiles: &ProfileTable,
    options: &ForecastOptions,
    rng: &mut R,
) -> Result<ForecastRun, ForecastError> {
    let commodity = commodity.trim();
    if commodity.is_empty() {
        return Err(ForecastError::Validation("Commodity name must not be empty.".to_string()));
    }
    if rows.is_empty() {
        return Err(ForecastError::Validation(format!("No history rows for '{commodity}'.")));
    }
    let category = resolve_category(commodity, options)?;
    let profile = profiles.get(category);

    // 1) Clean + resample.
    let series = prepare_series(commodity, rows)?;
    let last = *series
        .yearly
        .last()
        .ok_or_else(|| ForecastError::Validation(format!("No yearly prices for '{commodity}'.")))?;

    // 2) Growth and volatility off the same cleaned series.
    let growth = estimate_growth(&series.yearly, profile);
    let volatility = series.volatility();

    // 3) Statistical forecast.
    let order = SarimaOrder::for_category(category);
    let fit = fit_sarima(&series.yearly.prices(), &order)?;
    let model_forecast = fit.forecast(FORECAST_YEARS);

    // 4) Seasonal adjustment and monthly interpolation.
    let regime = profiles.regime(category, commodity);
    let adjustments = adjust_yearly(&model_forecast.mean, &last, growth, volatility, &regime)?;
    let yearly: Vec<ForecastPoint> = adjustments.iter().map(|a| a.point).collect();
    let monthly = interpolate_monthly(&last, &yearly, FORECAST_MONTHS, &regime, profile, volatility, rng)?;

    tracing::info!(
        commodity,
        %category,
        years = series.yearly.len(),
        growth,
        volatility,
        model = %fit.describe(),
        "forecast complete"
    );

    Ok(ForecastRun {
        result: ForecastResult {
            commodity: commodity.to_string(),
            category,
            yearly,
            monthly,
        },
        series,
        growth,
        volatility,
        model: fit.describe(),
        model_forecast,
        adjustments,
    })
}

/// Forecast several commodities in parallel, preserving input order.
///
/// Each commodity draws from its own generator: seeded from `seed` and the
/// commodity name when a seed is given, from OS entropy otherwise.
pub fn run_batch(
    histories: &[CommodityHistory],
    profiles: &ProfileTable,
    options: &ForecastOptions,
    seed: Option<u64>,
) -> Vec<BatchItem> {
    histories
        .par_iter()
        .map(|history| {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(commodity_seed(seed, &history.commodity)),
                None => StdRng::from_entropy(),
            };
            let outcome = run_forecast(&history.commodity, &history.rows, profiles, options, &mut rng);
            if let Err(err) = &outcome {
                tracing::warn!(commodity = %history.commodity, error = %err, "forecast failed");
            }
            BatchItem {
                commodity: history.commodity.clone(),
                outcome,
            }
        })
        .collect()
}

fn resolve_category(commodity: &str, options: &ForecastOptions) -> Result<Category, ForecastError> {
    match known_category(commodity) {
        Some(category) => Ok(category),
        None if options.strict_category => Err(ForecastError::Validation(format!(
            "Unknown commodity '{commodity}' (strict category mode)."
        ))),
        None => {
            tracing::debug!(commodity, "commodity not listed; using the 'others' profile");
            Ok(classify(commodity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleSpec, generate_history};
    use chrono::NaiveDate;

    fn history(commodity: &str, months: usize, base_price: f64, seed: u64) -> Vec<RawPriceRow> {
        let spec = SampleSpec {
            commodity: commodity.to_string(),
            start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            months,
            base_price,
            annual_growth: 0.08,
            noise_sd: 0.05,
            seed,
        };
        generate_history(&spec, &ProfileTable::builtin()).unwrap()
    }

    fn forecast(commodity: &str, rows: &[RawPriceRow], seed: u64) -> Result<ForecastRun, ForecastError> {
        let mut rng = StdRng::seed_from_u64(seed);
        run_forecast(commodity, rows, &ProfileTable::builtin(), &ForecastOptions::default(), &mut rng)
    }

    #[test]
    fn onion_forecast_has_expected_shape() {
        let rows = history("Onion", 60, 25.0, 1);
        let run = forecast("Onion", &rows, 42).unwrap();

        assert_eq!(run.result.category, Category::Vegetables);
        assert_eq!(run.result.yearly.len(), FORECAST_YEARS);
        assert_eq!(run.result.monthly.len(), FORECAST_MONTHS as usize);
        assert_eq!(run.result.yearly[0].date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(run.result.monthly[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        let profile = ProfileTable::builtin();
        let veg = profile.get(Category::Vegetables);
        assert!(run.growth >= veg.min_growth && run.growth <= veg.max_growth);

        let last = run.series.yearly.last().unwrap().price;
        let floor = last * veg.min_threshold;
        assert!(run.result.monthly.iter().all(|p| p.price >= floor - 0.005));
        assert!(run.result.yearly.iter().all(|p| p.price.is_finite() && p.price >= 0.0));
    }

    #[test]
    fn adjusted_years_respect_growth_window() {
        let rows = history("Wheat", 72, 22.0, 3);
        let run = forecast("wheat", &rows, 7).unwrap();

        for step in &run.adjustments {
            assert!(step.point.price >= (step.lower * 100.0).floor() / 100.0);
            assert!(step.point.price <= (step.upper * 100.0).ceil() / 100.0);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let rows = history("Tur/Arhar Dal", 48, 90.0, 5);
        let a = forecast("Tur/Arhar Dal", &rows, 11).unwrap();
        let b = forecast("Tur/Arhar Dal", &rows, 11).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.result.category, Category::Pulses);
    }

    #[test]
    fn unknown_commodity_falls_back_or_fails_in_strict_mode() {
        let rows = history("Saffron", 36, 500.0, 2);
        let run = forecast("Saffron", &rows, 1).unwrap();
        assert_eq!(run.result.category, Category::Others);

        let mut rng = StdRng::seed_from_u64(1);
        let strict = ForecastOptions { strict_category: true };
        let err = run_forecast("Saffron", &rows, &ProfileTable::builtin(), &strict, &mut rng).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(_)));
    }

    #[test]
    fn short_history_is_insufficient() {
        let rows = history("Rice", 8, 30.0, 1);
        let err = forecast("Rice", &rows, 1).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                commodity: "Rice".to_string(),
                found: 8,
                required: 12,
            }
        );
    }

    #[test]
    fn single_year_cannot_be_modelled() {
        let rows: Vec<RawPriceRow> = (1..=12)
            .map(|m| RawPriceRow::new(format!("2023-{m:02}-01"), format!("{}", 20 + m)))
            .collect();
        let err = forecast("Sugar", &rows, 1).unwrap_err();
        assert!(matches!(err, ForecastError::ForecastFit { .. }));
    }

    #[test]
    fn constant_prices_fail_to_fit() {
        let rows: Vec<RawPriceRow> = (0..36)
            .map(|i| RawPriceRow::new(format!("{}-{:02}-15", 2020 + i / 12, i % 12 + 1), "40"))
            .collect();
        let err = forecast("Milk", &rows, 1).unwrap_err();
        assert!(matches!(err, ForecastError::ForecastFit { .. }));
    }

    #[test]
    fn price_spike_never_yields_negative_prices() {
        let rows: Vec<RawPriceRow> = (0..36)
            .map(|i| {
                let (year, month) = (2020 + i / 12, i % 12 + 1);
                let price = if (year, month) == (2021, 4) { "10000" } else { "10" };
                RawPriceRow::new(format!("{year}-{month:02}-01"), price)
            })
            .collect();
        let run = forecast("Onion", &rows, 3).unwrap();
        assert!(run.volatility > 4.5);

        for step in &run.adjustments {
            assert!(step.lower <= step.upper);
            assert!(step.point.price >= 0.0);
        }
        assert!(run.result.yearly.iter().all(|p| p.price >= 0.0));
        assert!(run.result.monthly.iter().all(|p| p.price >= 0.0));
    }

    #[test]
    fn empty_request_is_rejected() {
        let rows = history("Onion", 24, 25.0, 1);
        assert!(matches!(forecast("  ", &rows, 1), Err(ForecastError::Validation(_))));
        assert!(matches!(forecast("Onion", &[], 1), Err(ForecastError::Validation(_))));
    }

    #[test]
    fn batch_matches_single_runs_and_keeps_order() {
        let histories = vec![
            CommodityHistory {
                commodity: "Potato".to_string(),
                rows: history("Potato", 48, 18.0, 1),
            },
            CommodityHistory {
                commodity: "Masoor Dal".to_string(),
                rows: history("Masoor Dal", 48, 85.0, 2),
            },
            CommodityHistory {
                commodity: "Salt Pack (Iodised)".to_string(),
                rows: history("Salt", 6, 20.0, 3),
            },
        ];
        let profiles = ProfileTable::builtin();
        let options = ForecastOptions::default();

        let batch = run_batch(&histories, &profiles, &options, Some(99));
        let names: Vec<&str> = batch.iter().map(|b| b.commodity.as_str()).collect();
        assert_eq!(names, vec!["Potato", "Masoor Dal", "Salt Pack (Iodised)"]);

        let mut rng = StdRng::seed_from_u64(commodity_seed(99, "Potato"));
        let single = run_forecast("Potato", &histories[0].rows, &profiles, &options, &mut rng).unwrap();
        assert_eq!(batch[0].outcome.as_ref().unwrap().result, single.result);

        assert!(batch[1].outcome.is_ok());
        assert!(matches!(batch[2].outcome, Err(ForecastError::InsufficientData { .. })));
    }
}
