//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads runtime configuration and sets up logging
//! - parses CLI arguments
//! - ingests CSV history or generates synthetic samples
//! - runs the forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use std::borrow::Cow;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::category::{ProfileTable, listed_commodities};
use crate::cli::{Command, DemoArgs, ForecastArgs, PlotArgs, ProfilesArgs, RunArgs};
use crate::config::RuntimeConfig;
use crate::data::{SampleSpec, generate_history};
use crate::domain::{Category, CommodityHistory, ForecastResult};
use crate::error::AppError;
use crate::io::IngestedHistory;

pub mod pipeline;

use pipeline::{BatchItem, ForecastOptions, ForecastRun};

/// Entry point for the `cropcast` binary.
pub fn run() -> Result<(), AppError> {
    let config = RuntimeConfig::from_env()?;
    init_tracing(&config.log_filter);

    let cli = crate::cli::Cli::parse();
    let profiles = config.load_profiles(cli.profiles.as_deref())?;

    match cli.command {
        Command::Forecast(args) => handle_forecast(args, &profiles, &config),
        Command::Profiles(args) => handle_profiles(args, &profiles),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args, &profiles, &config),
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    // A second init (e.g. from tests) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_forecast(args: ForecastArgs, profiles: &ProfileTable, config: &RuntimeConfig) -> Result<(), AppError> {
    let ingested = crate::io::load_price_history(&args.input)?;

    let histories = select_histories(&ingested, &args.commodities, &args.input)?;

    if !ingested.row_errors.is_empty() {
        eprintln!(
            "Skipped {} malformed CSV row(s) (first at line {}).",
            ingested.row_errors.len(),
            ingested.row_errors[0].line
        );
    }

    run_and_report(&histories, profiles, config, &args.run)
}

/// Every ingested commodity (borrowed) or the requested ones, in request order.
fn select_histories<'a>(
    ingested: &'a IngestedHistory,
    names: &[String],
    input: &Path,
) -> Result<Cow<'a, [CommodityHistory]>, AppError> {
    if names.is_empty() {
        return Ok(Cow::Borrowed(&ingested.histories));
    }
    names
        .iter()
        .map(|name| {
            ingested.find(name).cloned().ok_or_else(|| {
                AppError::new(
                    3,
                    format!(
                        "No rows for commodity '{name}' in '{}'. Available: {}",
                        input.display(),
                        ingested.commodity_names().join(", ")
                    ),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Cow::Owned)
}

fn handle_demo(args: DemoArgs, profiles: &ProfileTable, config: &RuntimeConfig) -> Result<(), AppError> {
    let seed = config.resolve_seed(args.run.seed).unwrap_or(42);

    let histories = args
        .commodities
        .iter()
        .map(|name| {
            let spec = SampleSpec {
                commodity: name.clone(),
                start: args.start,
                months: args.months,
                base_price: args.base_price,
                annual_growth: args.annual_growth,
                noise_sd: args.noise_sd,
                seed,
            };
            Ok(CommodityHistory {
                commodity: name.clone(),
                rows: generate_history(&spec, profiles)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let run = RunArgs {
        seed: Some(seed),
        ..args.run
    };
    run_and_report(&histories, profiles, config, &run)
}

fn run_and_report(
    histories: &[CommodityHistory],
    profiles: &ProfileTable,
    config: &RuntimeConfig,
    args: &RunArgs,
) -> Result<(), AppError> {
    let options = ForecastOptions {
        strict_category: args.strict_category,
    };
    let seed = config.resolve_seed(args.seed);
    let items = pipeline::run_batch(histories, profiles, &options, seed);

    let runs: Vec<&ForecastRun> = items.iter().filter_map(|i| i.outcome.as_ref().ok()).collect();
    if runs.is_empty() {
        return Err(first_error(&items));
    }

    if let [only] = items.as_slice() {
        if let Ok(run) = &only.outcome {
            print_run(run, args);
        }
    } else {
        let outlooks = crate::report::rank_outlooks(&runs);
        println!("{}", crate::report::format_batch_summary(&items, &outlooks));
        if args.monthly || args.plot {
            for run in &runs {
                print_run(run, args);
            }
        }
    }

    // Optional exports.
    if let Some(path) = &args.export_json {
        crate::io::write_forecast_json(path, &runs)?;
    }
    if let Some(path) = &args.export_csv {
        let results: Vec<&ForecastResult> = runs.iter().map(|r| &r.result).collect();
        crate::io::write_forecast_csv(path, &results)?;
    }

    Ok(())
}

fn print_run(run: &ForecastRun, args: &RunArgs) {
    println!("{}", crate::report::format_run_summary(run));
    if args.monthly {
        println!("Monthly forecast:");
        println!("{}", crate::report::format_monthly_grid(&run.result));
    }
    if args.plot {
        let plot = crate::plot::render_forecast_plot(&run.series.yearly.points, &run.result, args.width, args.height);
        println!("{plot}");
    }
}

fn first_error(items: &[BatchItem]) -> AppError {
    items
        .iter()
        .find_map(|i| i.outcome.as_ref().err())
        .map(|err| AppError::from(err.clone()))
        .unwrap_or_else(|| AppError::new(3, "No commodities to forecast."))
}

fn handle_profiles(args: ProfilesArgs, profiles: &ProfileTable) -> Result<(), AppError> {
    if args.json {
        println!("{}", profiles.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", crate::report::format_profiles(profiles));
    if args.commodities {
        println!();
        for category in Category::ALL {
            let names: Vec<&str> = listed_commodities()
                .filter(|(c, _)| *c == category)
                .map(|(_, name)| name)
                .collect();
            println!("{category}: {}", names.join(", "));
        }
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let doc = crate::io::read_forecast_json(&args.forecast)?;

    let record = match &args.commodity {
        Some(name) => doc
            .forecasts
            .iter()
            .find(|f| f.result.commodity.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| AppError::new(2, format!("No forecast for '{name}' in '{}'.", args.forecast.display())))?,
        None => &doc.forecasts[0],
    };

    println!("{}", crate::report::format_monthly_grid(&record.result));
    let plot = crate::plot::render_forecast_plot(&record.history, &record.result, args.width, args.height);
    println!("{plot}");
    Ok(())
}
