//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches BLS data or generates synthetic samples
//! - runs the inflation / forecast / evaluation stages
//! - prints reports and plots

use chrono::Datelike;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::analysis::{compare_tables, project_cogs_path, PriceProjector, ProjectionError};
use crate::cli::{CogsArgs, Command, DataArgs, EvaluateArgs, FetchArgs, ForecastArgs, PriceArgs, RunArgs, SampleArgs};
use crate::data::{generate_cpi_sample, load_sales_baseline, to_observations, BlsClient, SampleConfig, SalesBaseline};
use crate::domain::{Category, ModelKind, PipelineConfig, YearMonth};
use crate::error::AppError;
use crate::io::{load_inflation_table, write_cogs_path, write_cpi_table, write_metrics, write_raw_cpi, RowError};
use crate::report::format_row_errors;

pub mod pipeline;

/// Row errors shown before the remainder is summarized.
const MAX_ROW_ERRORS: usize = 10;

/// Entry point for the `cpi` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `cpi` and `cpi --data-dir x` behave like `cpi run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Sample(args) => handle_sample(args),
        Command::Inflation(args) => handle_inflation(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Price(args) => handle_price(args),
        Command::Cogs(args) => handle_cogs(args),
        Command::Run(args) => handle_run(args),
    }
}

/// Logs go to stderr so that reports on stdout stay pipeable.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cpi_outlook=info"));
    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let to_year = args.to_year.unwrap_or_else(|| chrono::Utc::now().year());

    let raw = BlsClient::from_env().fetch(&config.categories, args.from_year, to_year)?;
    write_raw_cpi(&config.raw_cpi_path(), &raw)?;

    let (observations, dropped) = to_observations(&raw);
    if observations.is_empty() {
        return Err(AppError::no_data("BLS returned no monthly CPI values."));
    }
    write_cpi_table(&config.cpi_path(), &observations)?;

    println!("=== cpi - Fetch ===");
    println!("BLS records: {} | monthly CPI rows: {} | dropped: {dropped}", raw.len(), observations.len());
    println!("Raw:  {}", config.raw_cpi_path().display());
    println!("CPI:  {}", config.cpi_path().display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let start = YearMonth::new(args.from_year, 1)
        .ok_or_else(|| AppError::input(format!("Invalid sample start year {}.", args.from_year)))?;
    let sample = SampleConfig {
        start,
        months: args.months,
        seed: args.seed,
        annual_drift_pct: args.drift,
        seasonal_amplitude_pct: args.seasonality,
        noise_pct: args.noise,
    };

    let observations = generate_cpi_sample(&config.categories, &sample)?;
    write_cpi_table(&config.cpi_path(), &observations)?;
    info!(rows = observations.len(), seed = args.seed, "wrote synthetic CPI sample");

    println!("=== cpi - Sample ===");
    println!(
        "{} rows ({} categories x {} months from {}), seed {}",
        observations.len(),
        config.categories.len(),
        args.months,
        start.label(),
        args.seed
    );
    println!("CPI:  {}", config.cpi_path().display());
    Ok(())
}

fn handle_inflation(args: DataArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let stage = pipeline::run_inflation(&config, &config.cpi_path())?;

    print!("{}", crate::report::format_inflation_summary(&stage.cleaned, &stage.table));
    print_row_errors(&stage.row_errors);
    println!("Inflation: {}", config.inflation_path().display());
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let kind = match args.model {
        Some(kind) => kind,
        None => crate::cli::picker::prompt_for_model()?,
    };

    let (inflation, row_errors) = pipeline::load_inflation(&config)?;
    print_row_errors(&row_errors);
    let stage = pipeline::run_forecast(&config, kind, &inflation)?;
    print_forecast(&config, &stage);
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let (actual, row_errors) = pipeline::load_inflation(&config)?;
    print_row_errors(&row_errors);

    let rows = match &args.predictive {
        Some(path) => {
            let predictive = load_inflation_table(path)?;
            print_row_errors(&predictive.row_errors);
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let rows = compare_tables(&label, &actual, &predictive.rows, &config.categories);
            write_metrics(&config.metrics_path(), &rows)?;
            rows
        }
        None => {
            let kinds = args.model.map_or_else(|| ModelKind::ALL.to_vec(), |k| vec![k]);
            let holdout = args.holdout.unwrap_or(12);
            pipeline::run_backtest(&config, &kinds, &actual, holdout)?
        }
    };

    for row in &rows {
        if let Err(e) = &row.outcome {
            warn!(model = %row.model, category = row.category.display_name(), %e, "no metrics");
        }
    }
    print!("{}", crate::report::format_metrics(&rows));
    println!("Metrics: {}", config.metrics_path().display());
    Ok(())
}

fn handle_price(args: PriceArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let projector = PriceProjector::new(config.reference_year, config.valid_years.clone());
    projector.check_year(args.year)?;

    let baseline = load_baseline(&config, args.sales.as_deref())?;
    let predictive = args.predictive.clone().unwrap_or_else(|| config.predictive_path());
    let rates = pipeline::load_rate_series(&predictive, args.category)?;

    let total = projector.project(baseline.average_total, &rates, args.year)?;
    let unit_price = projector.project(baseline.average_unit_price, &rates, args.year)?;

    print!(
        "{}",
        crate::report::format_price_projection(
            &baseline,
            args.category,
            config.reference_year,
            args.year,
            total,
            unit_price
        )
    );
    Ok(())
}

fn handle_cogs(args: CogsArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    if !(1..=12).contains(&args.month) {
        return Err(ProjectionError::MonthOutOfRange(args.month).into());
    }
    PriceProjector::new(config.reference_year, config.valid_years.clone()).check_year(args.year)?;
    if !(args.initial.is_finite() && args.initial > 0.0) {
        return Err(AppError::input("Initial COGS must be a positive number."));
    }
    let anchor = YearMonth::new(args.year, args.month)
        .ok_or_else(|| AppError::input(format!("Invalid anchor month {}-{}.", args.year, args.month)))?;

    let baseline = load_baseline(&config, args.sales.as_deref())?;
    let predictive = args.predictive.clone().unwrap_or_else(|| config.predictive_path());
    let rates = pipeline::load_rate_series(&predictive, args.category)?;

    let points = project_cogs_path(args.initial, anchor, &rates, baseline.average_gross_margin_pct)?;
    write_cogs_path(&config.cogs_path(), &points)?;

    print!(
        "{}",
        crate::report::format_cogs_summary(&points, baseline.average_gross_margin_pct)
    );
    if config.plot {
        println!(
            "{}",
            crate::plot::render_cogs_plot(&points, config.plot_width, config.plot_height)
        );
    }
    println!("COGS: {}", config.cogs_path().display());
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data)?;
    let cpi_path = args.cpi.clone().unwrap_or_else(|| config.cpi_path());

    let stage = pipeline::run_inflation(&config, &cpi_path)?;
    print!("{}", crate::report::format_inflation_summary(&stage.cleaned, &stage.table));
    print_row_errors(&stage.row_errors);

    let forecast = pipeline::run_forecast(&config, args.model, &stage.table.records)?;
    print_forecast(&config, &forecast);

    if args.holdout > 0 {
        let rows = pipeline::run_backtest(&config, &[args.model], &stage.table.records, args.holdout)?;
        print!("{}", crate::report::format_metrics(&rows));
        println!("Metrics: {}", config.metrics_path().display());
    }
    Ok(())
}

fn print_forecast(config: &PipelineConfig, stage: &pipeline::ForecastStage) {
    print!("{}", crate::report::format_forecast_summary(&stage.run));
    print_row_errors(&stage.row_errors);

    if config.plot {
        for &category in &config.categories {
            println!(
                "{}",
                crate::plot::render_merged_plot(&stage.merged, category, config.plot_width, config.plot_height)
            );
        }
    }
    println!("Forecast: {}", config.forecast_path().display());
    println!("Merged:   {}", config.predictive_path().display());
}

fn print_row_errors(errors: &[RowError]) {
    if !errors.is_empty() {
        warn!(count = errors.len(), "skipped malformed rows");
        print!("{}", format_row_errors(errors, MAX_ROW_ERRORS));
    }
}

fn load_baseline(config: &PipelineConfig, sales: Option<&std::path::Path>) -> Result<SalesBaseline, AppError> {
    let path = sales.map_or_else(|| config.sales_path(), |p| p.to_path_buf());
    let (baseline, row_errors) = load_sales_baseline(&path)?;
    print_row_errors(&row_errors);
    Ok(baseline)
}

/// Build the pipeline configuration from shared arguments.
pub fn config_from_args(args: &DataArgs) -> Result<PipelineConfig, AppError> {
    if args.min_year > args.max_year {
        return Err(AppError::input(format!(
            "Invalid year range: --min-year {} > --max-year {}.",
            args.min_year, args.max_year
        )));
    }
    let horizon_end = YearMonth::new(args.through_year, args.through_month).ok_or_else(|| {
        AppError::input(format!(
            "Invalid horizon end {}-{}.",
            args.through_year, args.through_month
        ))
    })?;

    let mut categories: Vec<Category> = Vec::new();
    for &c in &args.categories {
        if !categories.contains(&c) {
            categories.push(c);
        }
    }
    if categories.is_empty() {
        categories = Category::ALL.to_vec();
    }

    Ok(PipelineConfig {
        data_dir: args.data_dir.clone(),
        categories,
        horizon_end,
        valid_years: args.min_year..=args.max_year,
        reference_year: args.reference_year,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

/// Rewrite argv so `cpi` defaults to `cpi run`.
///
/// Rules:
/// - `cpi`                      -> `cpi run`
/// - `cpi --data-dir x ...`     -> `cpi run --data-dir x ...`
/// - `cpi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
