//! Command-line parsing for the commodity price forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! forecasting code. Dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cropcast", version, about = "Commodity price forecaster with seasonal adjustment")]
pub struct Cli {
    /// Category profile JSON (overrides CROPCAST_PROFILES; built-in table otherwise).
    #[arg(long, global = true, value_name = "JSON")]
    pub profiles: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast commodities from a price history CSV (`date,commodity,price`).
    Forecast(ForecastArgs),
    /// Print the category profile table (or dump it as JSON).
    Profiles(ProfilesArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
    /// Forecast synthetic history (no input file needed).
    Demo(DemoArgs),
}

/// Options shared by commands that run the pipeline.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Random seed for monthly variation (overrides CROPCAST_SEED; entropy otherwise).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reject commodities that are not in any category list instead of using `others`.
    #[arg(long)]
    pub strict_category: bool,

    /// Print the 60 monthly values as a year x month grid.
    #[arg(long)]
    pub monthly: bool,

    /// Render an ASCII plot of history and forecast.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export forecasts (with history) to JSON, readable by `cropcast plot`.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export forecast points to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Price history CSV with `date`, `commodity` and `price` columns.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Commodity to forecast (repeatable, case-insensitive). Defaults to every commodity in the file.
    #[arg(short, long = "commodity", value_name = "NAME")]
    pub commodities: Vec<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ProfilesArgs {
    /// Dump the table as JSON (a valid `--profiles` file).
    #[arg(long)]
    pub json: bool,

    /// Also list the commodities of each category.
    #[arg(long)]
    pub commodities: bool,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Commodity to plot when the file holds several (first one otherwise).
    #[arg(short, long)]
    pub commodity: Option<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Commodities to simulate (repeatable).
    #[arg(short, long = "commodity", value_name = "NAME", default_values_t = [
        "Onion".to_string(),
        "Moong Dal".to_string(),
        "Mustard Oil".to_string(),
        "Wheat".to_string(),
        "Sugar".to_string(),
    ])]
    pub commodities: Vec<String>,

    /// Months of synthetic history per commodity.
    #[arg(long, default_value_t = 72)]
    pub months: usize,

    /// First month of the synthetic history (YYYY-MM-DD).
    #[arg(long, default_value = "2018-01-01")]
    pub start: chrono::NaiveDate,

    /// Starting price level.
    #[arg(long, default_value_t = 40.0)]
    pub base_price: f64,

    /// Annual drift of the synthetic prices.
    #[arg(long, default_value_t = 0.06)]
    pub annual_growth: f64,

    /// Log-scale noise of the synthetic prices.
    #[arg(long, default_value_t = 0.05)]
    pub noise_sd: f64,

    #[command(flatten)]
    pub run: RunArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn forecast_args_parse() {
        let cli = Cli::parse_from([
            "cropcast",
            "--profiles",
            "p.json",
            "forecast",
            "-i",
            "prices.csv",
            "-c",
            "Onion",
            "-c",
            "wheat",
            "--seed",
            "7",
            "--strict-category",
        ]);
        assert_eq!(cli.profiles, Some(PathBuf::from("p.json")));
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.commodities, vec!["Onion", "wheat"]);
        assert_eq!(args.run.seed, Some(7));
        assert!(args.run.strict_category);
        assert!(!args.run.plot);
    }

    #[test]
    fn demo_has_default_basket() {
        let cli = Cli::parse_from(["cropcast", "demo"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.commodities.len(), 5);
        assert_eq!(args.months, 72);
    }
}
