//! Shared pipeline stages used by the subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CPI table -> inflation -> forecast -> merge -> evaluation
//!
//! The handlers in `app` then only deal with presentation (printing and plots).

use std::path::Path;

use tracing::info;

use crate::analysis::{
    backtest, calculate_inflation, clean_observations, merge_tables, CleanedCpi, EvaluationRow,
    InflationTable, RateRecord,
};
use crate::domain::{Category, InflationRecord, MergedRecord, ModelKind, PipelineConfig};
use crate::error::AppError;
use crate::fit::{forecast_categories, ForecastRun};
use crate::io::{
    load_cpi_table, load_inflation_table, write_forecast_table, write_inflation_table, write_merged_table,
    write_metrics, RowError,
};
use crate::models::strategy_for;

/// Outputs of the CPI -> inflation stage.
#[derive(Debug, Clone)]
pub struct InflationStage {
    pub cleaned: CleanedCpi,
    pub table: InflationTable,
    pub row_errors: Vec<RowError>,
}

/// Outputs of one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastStage {
    pub run: ForecastRun,
    pub merged: Vec<MergedRecord>,
    /// Row problems found while reading the tables back for the merge.
    pub row_errors: Vec<RowError>,
}

/// Read the CPI table at `cpi_path`, compute inflation and write the
/// inflation table.
pub fn run_inflation(config: &PipelineConfig, cpi_path: &Path) -> Result<InflationStage, AppError> {
    let loaded = load_cpi_table(cpi_path)?;
    info!(path = %cpi_path.display(), rows = loaded.rows.len(), "loaded CPI table");

    let cleaned = clean_observations(loaded.rows);
    let table = calculate_inflation(&cleaned.observations);
    if table.records.is_empty() {
        return Err(AppError::no_data(
            "CPI table has no consecutive months; no inflation rates could be computed.",
        ));
    }

    write_inflation_table(&config.inflation_path(), &table.records)?;
    info!(
        path = %config.inflation_path().display(),
        records = table.records.len(),
        gaps = table.gaps,
        "wrote inflation table"
    );

    Ok(InflationStage {
        cleaned,
        table,
        row_errors: loaded.row_errors,
    })
}

/// Load the inflation table written by [`run_inflation`].
pub fn load_inflation(config: &PipelineConfig) -> Result<(Vec<InflationRecord>, Vec<RowError>), AppError> {
    let path = config.inflation_path();
    let loaded = load_inflation_table(&path)?;
    if loaded.rows.is_empty() {
        return Err(AppError::no_data(format!(
            "No inflation rows in '{}'. Run `cpi inflation` first.",
            path.display()
        )));
    }
    Ok((loaded.rows, loaded.row_errors))
}

/// Forecast every configured category with `kind`, write the forecast table
/// and the merged (predictive) tables.
pub fn run_forecast(
    config: &PipelineConfig,
    kind: ModelKind,
    inflation: &[InflationRecord],
) -> Result<ForecastStage, AppError> {
    let strategy = strategy_for(kind);
    info!(model = kind.slug(), categories = config.categories.len(), "fitting forecasts");
    let run = forecast_categories(strategy.as_ref(), inflation, &config.categories, config.horizon_end);

    let forecast_path = config.forecast_path();
    write_forecast_table(&forecast_path, &run.records())?;

    let (merged, row_errors) = merge_tables(&config.inflation_path(), &forecast_path)?;
    write_merged_table(&config.predictive_path(), &merged)?;
    write_merged_table(&config.predictive_path_for(kind), &merged)?;
    info!(
        forecast = %forecast_path.display(),
        merged = %config.predictive_path().display(),
        rows = merged.len(),
        failures = run.failures().len(),
        "wrote forecast and merged tables"
    );

    Ok(ForecastStage {
        run,
        merged,
        row_errors,
    })
}

/// Holdout backtest of each strategy in `kinds`; rows are written to the
/// metrics table.
pub fn run_backtest(
    config: &PipelineConfig,
    kinds: &[ModelKind],
    inflation: &[InflationRecord],
    holdout: usize,
) -> Result<Vec<EvaluationRow>, AppError> {
    let mut rows = Vec::new();
    for &kind in kinds {
        let strategy = strategy_for(kind);
        info!(model = kind.slug(), holdout, "backtesting");
        rows.extend(backtest(strategy.as_ref(), inflation, &config.categories, holdout));
    }
    write_metrics(&config.metrics_path(), &rows)?;
    Ok(rows)
}

/// One category's rates from a merged (predictive) table, in calendar order.
pub fn load_rate_series(path: &Path, category: Category) -> Result<Vec<RateRecord>, AppError> {
    let loaded = load_inflation_table(path)?;
    let mut series: Vec<InflationRecord> = loaded.rows.into_iter().filter(|r| r.category == category).collect();
    series.sort_by_key(|r| r.period);
    if series.is_empty() {
        return Err(AppError::no_data(format!(
            "No '{}' rows in '{}'. Run `cpi forecast` first.",
            category.display_name(),
            path.display()
        )));
    }
    Ok(series.iter().map(RateRecord::from).collect())
}
