//! Forecast strategies.
//!
//! Every strategy takes one category's inflation history and returns exactly
//! `horizon` forecast values, or a `FitError` explaining why it could not.
//! Strategies are pure; batching, parallelism and failure isolation live in
//! `crate::fit`.

pub mod arima;
pub mod linear;
pub mod sarima;

pub use arima::ArimaStrategy;
pub use linear::LinearTrendStrategy;
pub use sarima::SarimaStrategy;

use thiserror::Error;

use crate::domain::{ModelKind, YearMonth};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("history is empty")]
    EmptyHistory,
    #[error("need at least {required} usable observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("singular system while estimating {0}")]
    Singular(&'static str),
    #[error("forecast produced non-finite values")]
    NonFinite,
    #[error("forecast has {actual} values, expected {expected}")]
    ForecastLength { expected: usize, actual: usize },
}

/// One month of a category's history. `value` is `None` for undefined rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub period: YearMonth,
    pub value: Option<f64>,
}

pub trait ForecastStrategy: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Fit on `history` (chronological) and forecast `horizon` months ahead.
    fn fit_and_forecast(&self, history: &[SeriesPoint], horizon: usize) -> Result<Vec<f64>, FitError>;
}

pub fn strategy_for(kind: ModelKind) -> Box<dyn ForecastStrategy> {
    match kind {
        ModelKind::Sarima => Box::new(SarimaStrategy::default()),
        ModelKind::Arima => Box::new(ArimaStrategy::default()),
        ModelKind::Linear => Box::new(LinearTrendStrategy),
    }
}

/// Values for the ARIMA family on a continuous monthly calendar.
///
/// Leading undefined values are dropped. Undefined values, and months missing
/// between two points, carry the last defined value forward so that lag `k`
/// is always `k` calendar months back.
pub fn carry_forward(history: &[SeriesPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(history.len());
    let mut last: Option<f64> = None;
    let mut prev_period: Option<YearMonth> = None;
    for point in history {
        if let (Some(prev), Some(v)) = (prev_period, last) {
            let missing = prev.months_until(point.period) - 1;
            for _ in 0..missing.max(0) {
                out.push(v);
            }
        }
        prev_period = Some(point.period);
        if let Some(v) = point.value.filter(|v| v.is_finite()) {
            last = Some(v);
        }
        if let Some(v) = last {
            out.push(v);
        }
    }
    out
}

pub(crate) fn ensure_finite(values: Vec<f64>) -> Result<Vec<f64>, FitError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(values)
    } else {
        Err(FitError::NonFinite)
    }
}

#[cfg(test)]
pub(crate) fn points_from(start: YearMonth, values: &[Option<f64>]) -> Vec<SeriesPoint> {
    let mut periods = vec![start];
    periods.extend(start.following(values.len().saturating_sub(1)));
    periods
        .into_iter()
        .zip(values.iter().copied())
        .map(|(period, value)| SeriesPoint { period, value })
        .collect()
}
