//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use std::collections::BTreeSet;

use chrono::Datelike;

use crate::app::pipeline::{BatchItem, ForecastRun};
use crate::category::{ProfileTable, SeasonalMonths};
use crate::domain::{Category, ForecastResult};

use super::{Outlook, yearly_changes};

/// Format the full run summary (history stats + model + adjusted yearly table).
pub fn format_run_summary(run: &ForecastRun) -> String {
    let mut out = String::new();
    let series = &run.series;

    out.push_str("=== cropcast - Commodity Price Forecast ===\n");
    out.push_str(&format!(
        "Commodity: {} ({})\n",
        run.result.commodity, run.result.category
    ));
    out.push_str(&format!(
        "History: rows={} used={} dropped={} | years={}",
        series.rows_read,
        series.points.len(),
        series.issues.len(),
        series.yearly.len(),
    ));
    if let (Some(first), Some(last)) = (series.points.first(), series.points.last()) {
        out.push_str(&format!(" | {} .. {}", first.date, last.date));
    }
    out.push('\n');
    out.push_str(&format!(
        "Growth: {:.2}% | Volatility: {:.4}\n",
        run.growth * 100.0,
        run.volatility
    ));
    out.push_str(&format!("Model: {}\n", run.model));

    out.push_str("\nYearly forecast:\n");
    out.push_str(&format_yearly_table(run));
    out.push('\n');

    out
}

fn format_yearly_table(run: &ForecastRun) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:>10} {:>7} {:>10} {:>10} {:>10} {:>8}",
            "date", "model", "factor", "lower", "upper", "price", "change"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<10} {:-<10} {:-<7} {:-<10} {:-<10} {:-<10} {:-<8}",
            "", "", "", "", "", "", ""
        ),
    );

    let changes = yearly_changes(run);
    for (step, change) in run.adjustments.iter().zip(changes) {
        let flag = if step.substituted { " *" } else { "" };
        push_line(
            &mut out,
            format!(
                "{:<10} {:>10.2} {:>7.3} {:>10.2} {:>10.2} {:>10.2} {:>7.1}%{flag}",
                step.point.date,
                step.raw,
                step.seasonal_factor,
                step.lower,
                step.upper,
                step.point.price,
                change * 100.0,
            ),
        );
    }
    if run.adjustments.iter().any(|a| a.substituted) {
        out.push_str("* model value was not finite; growth projection used\n");
    }
    out
}

/// Monthly forecast as a year x month grid.
pub fn format_monthly_grid(result: &ForecastResult) -> String {
    let mut out = String::new();
    let mut header = format!("{:<6}", "year");
    for month in ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"] {
        header.push_str(&format!(" {month:>8}"));
    }
    push_line(&mut out, header);

    let years: BTreeSet<i32> = result.monthly.iter().map(|p| p.date.year()).collect();
    for year in years {
        let mut line = format!("{year:<6}");
        for month in 1..=12 {
            match result
                .monthly
                .iter()
                .find(|p| p.date.year() == year && p.date.month() == month)
            {
                Some(p) => line.push_str(&format!(" {:>8.2}", p.price)),
                None => line.push_str(&format!(" {:>8}", "")),
            }
        }
        push_line(&mut out, line);
    }
    out
}

/// One line per commodity of a batch, failures included.
pub fn format_batch_summary(items: &[BatchItem], outlooks: &[Outlook]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<22} {:<10} {:>10} {:>10} {:>8} {:>7}",
            "commodity", "category", "last", "year 5", "change", "cagr"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<22} {:-<10} {:-<10} {:-<10} {:-<8} {:-<7}", "", "", "", "", "", ""),
    );

    for o in outlooks {
        push_line(
            &mut out,
            format!(
                "{:<22} {:<10} {:>10.2} {:>10.2} {:>7.1}% {:>6.2}%",
                truncate(&o.commodity, 22),
                o.category,
                o.last_price,
                o.final_price,
                o.total_change * 100.0,
                o.implied_cagr * 100.0,
            ),
        );
    }

    let failures: Vec<&BatchItem> = items.iter().filter(|i| i.outcome.is_err()).collect();
    if !failures.is_empty() {
        out.push_str("\nFailed:\n");
        for item in failures {
            if let Err(err) = &item.outcome {
                out.push_str(&format!("- {}: {err}\n", item.commodity));
            }
        }
    }
    out
}

/// The profile table, one block per category.
pub fn format_profiles(profiles: &ProfileTable) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        let p = profiles.get(category);
        out.push_str(&format!("[{category}]\n"));
        out.push_str(&format!(
            "  growth       : {:.2} .. {:.2}\n",
            p.min_growth, p.max_growth
        ));
        out.push_str(&format!(
            "  volatility   : {:.2} .. {:.2}\n",
            p.volatility_range.0, p.volatility_range.1
        ));
        out.push_str(&format!(
            "  peak months  : {} (x{:.2})\n",
            fmt_months(p.peak_months.as_ref()),
            p.peak_factor
        ));
        out.push_str(&format!(
            "  harvest      : {} (x{:.2})\n",
            fmt_months(p.harvest_months.as_ref()),
            p.harvest_factor
        ));
        out.push_str(&format!("  min threshold: {:.2}\n", p.min_threshold));
    }
    out
}

fn fmt_months(months: Option<&SeasonalMonths>) -> String {
    let join = |set: &BTreeSet<u32>| set.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
    match months {
        None => "none".to_string(),
        Some(SeasonalMonths::Flat(set)) => join(set),
        Some(SeasonalMonths::PerCommodity(map)) => map
            .iter()
            .map(|(name, set)| format!("{name} {}", join(set)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastPoint, month_end};

    #[test]
    fn monthly_grid_lays_out_years() {
        let monthly = (1..=24)
            .map(|k| {
                let date = month_end(2024 + (k - 1) / 12, ((k - 1) % 12 + 1) as u32).unwrap();
                ForecastPoint::new(date, 10.0 + k as f64)
            })
            .collect();
        let result = ForecastResult {
            commodity: "Tea Loose".to_string(),
            category: Category::Others,
            yearly: Vec::new(),
            monthly,
        };

        let grid = format_monthly_grid(&result);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year"));
        assert!(lines[1].starts_with("2024"));
        assert!(lines[1].ends_with("22.00"));
        assert!(lines[2].contains("23.00"));
    }

    #[test]
    fn profiles_show_per_commodity_months() {
        let text = format_profiles(&ProfileTable::builtin());
        assert!(text.contains("[vegetables]"));
        assert!(text.contains("onion 7,8,9"));
        assert!(text.contains("[others]"));
        assert!(text.contains("harvest      : none"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Salt Pack (Iodised)", 8), "Salt Pa.");
        assert_eq!(truncate("Gur", 8), "Gur");
    }
}
