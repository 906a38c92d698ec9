//! Command-line parsing for the CPI inflation forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis/modeling code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    Category, ModelKind, DEFAULT_HORIZON_END_YEAR, DEFAULT_REFERENCE_YEAR, DEFAULT_START_YEAR, MAX_PROJECTION_YEAR,
    MIN_PROJECTION_YEAR,
};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpi", version, about = "Food CPI inflation forecaster and price projector")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download food CPI series from the BLS public API.
    Fetch(FetchArgs),
    /// Write a seeded synthetic CPI table (offline runs).
    Sample(SampleArgs),
    /// Compute month-over-month inflation from the CPI table.
    Inflation(DataArgs),
    /// Forecast inflation per category and merge it with history.
    ///
    /// Without `--model` an interactive menu asks which strategy to run.
    Forecast(ForecastArgs),
    /// Score forecasts: holdout backtest or comparison against a predictive table.
    Evaluate(EvaluateArgs),
    /// Project the supermarket sales baseline to a target year.
    Price(PriceArgs),
    /// Project a monthly cost-of-goods path anchored at a given month.
    Cogs(CogsArgs),
    /// Inflation -> forecast -> merge -> backtest in one go (default).
    Run(RunArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Directory holding input and output tables.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Categories to process (comma-separated; default: all).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub categories: Vec<Category>,

    /// Forecast through December of this year.
    #[arg(long, default_value_t = DEFAULT_HORIZON_END_YEAR)]
    pub through_year: i32,

    /// Forecast through this month of `--through-year`.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub through_month: u32,

    /// Earliest target year accepted by projections.
    #[arg(long, default_value_t = MIN_PROJECTION_YEAR)]
    pub min_year: i32,

    /// Latest target year accepted by projections.
    #[arg(long, default_value_t = MAX_PROJECTION_YEAR)]
    pub max_year: i32,

    /// Year the sales baseline was observed in.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_YEAR)]
    pub reference_year: i32,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// First year to request.
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub from_year: i32,

    /// Last year to request (default: current year).
    #[arg(long)]
    pub to_year: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First sampled year (January).
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub from_year: i32,

    /// Number of months to generate.
    #[arg(long, default_value_t = 126)]
    pub months: usize,

    /// Annual CPI drift in percent.
    #[arg(long, default_value_t = 3.0)]
    pub drift: f64,

    /// Seasonal amplitude in percent.
    #[arg(long, default_value_t = 0.4)]
    pub seasonality: f64,

    /// Monthly noise standard deviation in percent.
    #[arg(long, default_value_t = 0.25)]
    pub noise: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Forecast strategy (prompted for when omitted).
    #[arg(long, value_enum)]
    pub model: Option<ModelKind>,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Months held out per category for the backtest.
    #[arg(long, conflicts_with = "predictive")]
    pub holdout: Option<usize>,

    /// Predictive (merged) table to compare against the inflation table.
    #[arg(long, value_name = "CSV")]
    pub predictive: Option<PathBuf>,

    /// Restrict the backtest to one strategy (default: all).
    #[arg(long, value_enum)]
    pub model: Option<ModelKind>,
}

#[derive(Debug, Args, Clone)]
pub struct PriceArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Target year.
    #[arg(long)]
    pub year: i32,

    /// Inflation series used for the projection.
    #[arg(long, value_enum, default_value_t = Category::FoodAndBeverage)]
    pub category: Category,

    /// Predictive table (default: `<data-dir>/predictive_inflation.csv`).
    #[arg(long, value_name = "CSV")]
    pub predictive: Option<PathBuf>,

    /// Sales table (default: `<data-dir>/supermarket_sales.csv`).
    #[arg(long, value_name = "CSV")]
    pub sales: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CogsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Cost of goods sold at the anchor month.
    #[arg(long)]
    pub initial: f64,

    /// Anchor year.
    #[arg(long)]
    pub year: i32,

    /// Anchor month (1-12).
    #[arg(long)]
    pub month: u32,

    /// Inflation series used for the path.
    #[arg(long, value_enum, default_value_t = Category::FoodAndBeverage)]
    pub category: Category,

    /// Predictive table (default: `<data-dir>/predictive_inflation.csv`).
    #[arg(long, value_name = "CSV")]
    pub predictive: Option<PathBuf>,

    /// Sales table (default: `<data-dir>/supermarket_sales.csv`).
    #[arg(long, value_name = "CSV")]
    pub sales: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Forecast strategy.
    #[arg(long, value_enum, default_value_t = ModelKind::Sarima)]
    pub model: ModelKind,

    /// Months held out per category for the backtest (0 disables it).
    #[arg(long, default_value_t = 12)]
    pub holdout: usize,

    /// CPI table (default: `<data-dir>/transformed_food_cpi_data.csv`).
    #[arg(long, value_name = "CSV")]
    pub cpi: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forecast_with_categories() {
        let cli = Cli::parse_from([
            "cpi",
            "forecast",
            "--model",
            "arima",
            "--categories",
            "food-at-home,food-and-beverage",
            "--through-year",
            "2026",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.model, Some(ModelKind::Arima));
        assert_eq!(args.data.categories, vec![Category::FoodAtHome, Category::FoodAndBeverage]);
        assert_eq!(args.data.through_year, 2026);
        assert_eq!(args.data.through_month, 12);
    }

    #[test]
    fn holdout_and_predictive_conflict() {
        let res = Cli::try_parse_from(["cpi", "evaluate", "--holdout", "6", "--predictive", "x.csv"]);
        assert!(res.is_err());
    }

    #[test]
    fn month_range_is_validated() {
        assert!(Cli::try_parse_from(["cpi", "inflation", "--through-month", "13"]).is_err());
    }
}
