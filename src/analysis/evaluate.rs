//! Forecast accuracy metrics and backtests.
//!
//! Two series are compared position by position from their first element; the
//! longer one is truncated to the shorter length. Pairs where either side is
//! undefined are skipped and counted.

use rayon::prelude::*;
use thiserror::Error;

use crate::domain::{Category, InflationRecord};
use crate::fit::category_history;
use crate::models::{FitError, ForecastStrategy, SeriesPoint};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("no comparable pairs (every aligned pair has an undefined value)")]
    NoComparablePairs,
    #[error("holdout of {holdout} months needs a longer history (have {available})")]
    HoldoutTooLong { holdout: usize, available: usize },
    #[error(transparent)]
    Fit(#[from] FitError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Pairs that entered the metrics.
    pub compared: usize,
    /// Aligned pairs dropped because a value was undefined.
    pub skipped: usize,
}

/// Truncate both series to the shorter length.
pub fn align<'a, A, B>(actual: &'a [A], forecast: &'a [B]) -> (&'a [A], &'a [B]) {
    let n = actual.len().min(forecast.len());
    (&actual[..n], &forecast[..n])
}

pub fn evaluate(actual: &[Option<f64>], forecast: &[Option<f64>]) -> Result<ForecastMetrics, EvalError> {
    let (actual, forecast) = align(actual, forecast);

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut compared = 0usize;
    let mut skipped = 0usize;
    for (a, f) in actual.iter().zip(forecast) {
        match (a, f) {
            (Some(a), Some(f)) if a.is_finite() && f.is_finite() => {
                let err = a - f;
                abs_sum += err.abs();
                sq_sum += err * err;
                compared += 1;
            }
            _ => skipped += 1,
        }
    }
    if compared == 0 {
        return Err(EvalError::NoComparablePairs);
    }

    let mse = sq_sum / compared as f64;
    Ok(ForecastMetrics {
        mae: abs_sum / compared as f64,
        mse,
        rmse: mse.sqrt(),
        compared,
        skipped,
    })
}

/// One line of a metrics table.
#[derive(Debug, Clone)]
pub struct EvaluationRow {
    /// Strategy name or predictive file label.
    pub model: String,
    pub category: Category,
    pub outcome: Result<ForecastMetrics, EvalError>,
}

/// Hold out the last `holdout` months of every category, fit on the rest and
/// score the forecast against the held-out months.
pub fn backtest(
    strategy: &dyn ForecastStrategy,
    inflation: &[InflationRecord],
    categories: &[Category],
    holdout: usize,
) -> Vec<EvaluationRow> {
    categories
        .par_iter()
        .map(|&category| {
            let history = category_history(inflation, category);
            let outcome = backtest_one(strategy, &history, holdout);
            EvaluationRow {
                model: strategy.kind().display_name().to_string(),
                category,
                outcome,
            }
        })
        .collect()
}

fn backtest_one(
    strategy: &dyn ForecastStrategy,
    history: &[SeriesPoint],
    holdout: usize,
) -> Result<ForecastMetrics, EvalError> {
    if holdout == 0 || history.len() <= holdout {
        return Err(EvalError::HoldoutTooLong {
            holdout,
            available: history.len(),
        });
    }
    let (train, test) = history.split_at(history.len() - holdout);
    let forecast = strategy.fit_and_forecast(train, holdout)?;
    let actual: Vec<Option<f64>> = test.iter().map(|p| p.value).collect();
    let predicted: Vec<Option<f64>> = forecast.into_iter().map(Some).collect();
    evaluate(&actual, &predicted)
}

/// Compare actual inflation against a predictive (merged) table.
///
/// For each category the predictive series is taken from the first month of
/// the actual series onward, then both are compared positionally.
pub fn compare_tables(
    label: &str,
    actual: &[InflationRecord],
    predictive: &[InflationRecord],
    categories: &[Category],
) -> Vec<EvaluationRow> {
    categories
        .iter()
        .map(|&category| {
            let actual_series = category_history(actual, category);
            let start = actual_series.first().map(|p| p.period);
            let predicted: Vec<SeriesPoint> = category_history(predictive, category)
                .into_iter()
                .filter(|p| start.is_some_and(|s| p.period >= s))
                .collect();

            let a: Vec<Option<f64>> = actual_series.iter().map(|p| p.value).collect();
            let f: Vec<Option<f64>> = predicted.iter().map(|p| p.value).collect();
            EvaluationRow {
                model: label.to_string(),
                category,
                outcome: evaluate(&a, &f),
            }
        })
        .collect()
}
