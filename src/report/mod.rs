//! Reporting utilities: outlook summaries, rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::app::pipeline::ForecastRun;
use crate::domain::Category;

/// Five-year outlook of one commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct Outlook {
    pub commodity: String,
    pub category: Category,
    /// Last yearly price of the history.
    pub last_price: f64,
    /// Last yearly forecast price.
    pub final_price: f64,
    /// `final / last - 1`.
    pub total_change: f64,
    /// Annualized change over the forecast years.
    pub implied_cagr: f64,
}

/// Outlook for a run; `None` if the run has no usable endpoints.
pub fn outlook(run: &ForecastRun) -> Option<Outlook> {
    let last_price = run.series.yearly.last()?.price;
    let final_price = run.result.yearly.last()?.price;
    let years = run.result.yearly.len() as f64;
    if !(last_price > 0.0 && final_price.is_finite()) {
        return None;
    }

    let ratio = final_price / last_price;
    Some(Outlook {
        commodity: run.result.commodity.clone(),
        category: run.result.category,
        last_price,
        final_price,
        total_change: ratio - 1.0,
        implied_cagr: ratio.powf(1.0 / years) - 1.0,
    })
}

/// Outlooks sorted by total change, largest rise first.
pub fn rank_outlooks(runs: &[&ForecastRun]) -> Vec<Outlook> {
    let mut out: Vec<Outlook> = runs.iter().filter_map(|run| outlook(run)).collect();
    out.sort_by(|a, b| b.total_change.partial_cmp(&a.total_change).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Year-over-year change of each forecast year, starting from the last observed price.
pub fn yearly_changes(run: &ForecastRun) -> Vec<f64> {
    let Some(last) = run.series.yearly.last() else {
        return Vec::new();
    };
    let mut prev = last.price;
    run.result
        .yearly
        .iter()
        .map(|p| {
            let change = if prev > 0.0 { p.price / prev - 1.0 } else { f64::NAN };
            prev = p.price;
            change
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{ForecastOptions, run_forecast};
    use crate::category::ProfileTable;
    use crate::data::{SampleSpec, generate_history};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(commodity: &str, base_price: f64, annual_growth: f64) -> ForecastRun {
        let profiles = ProfileTable::builtin();
        let rows = generate_history(
            &SampleSpec {
                commodity: commodity.to_string(),
                start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                months: 72,
                base_price,
                annual_growth,
                noise_sd: 0.02,
                seed: 8,
            },
            &profiles,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        run_forecast(commodity, &rows, &profiles, &ForecastOptions::default(), &mut rng).unwrap()
    }

    #[test]
    fn outlook_matches_endpoints() {
        let r = run("Rice", 30.0, 0.05);
        let o = outlook(&r).unwrap();
        let last = r.series.yearly.last().unwrap().price;
        let fin = r.result.yearly[4].price;
        assert_relative_eq!(o.total_change, fin / last - 1.0, epsilon = 1e-12);
        assert_relative_eq!((1.0 + o.implied_cagr).powi(5), fin / last, epsilon = 1e-9);
    }

    #[test]
    fn yearly_changes_chain_from_history() {
        let r = run("Sugar", 40.0, 0.04);
        let changes = yearly_changes(&r);
        assert_eq!(changes.len(), 5);
        let last = r.series.yearly.last().unwrap().price;
        assert_relative_eq!(changes[0], r.result.yearly[0].price / last - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rankings_sort_by_total_change() {
        let a = run("Rice", 30.0, 0.02);
        let b = run("Onion", 25.0, 0.20);
        let ranked = rank_outlooks(&[&a, &b]);
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].total_change >= ranked[1].total_change);
    }
}
