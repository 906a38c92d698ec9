//! Linear trend on a month index.
//!
//! Each month maps to `(year - min_year) * 12 + month`, where `min_year` is the
//! first year in the category's history. The rate is regressed on
//! `[1, index]` and the fitted line is evaluated at the following indices.

use nalgebra::DVector;

use crate::domain::ModelKind;
use crate::math::{design_matrix, solve_least_squares};
use crate::models::{ensure_finite, FitError, ForecastStrategy, SeriesPoint};

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTrendStrategy;

fn month_index(point: &SeriesPoint, min_year: i32) -> f64 {
    f64::from((point.period.year() - min_year) * 12) + f64::from(point.period.month())
}

impl ForecastStrategy for LinearTrendStrategy {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn fit_and_forecast(&self, history: &[SeriesPoint], horizon: usize) -> Result<Vec<f64>, FitError> {
        let (Some(min_year), Some(last)) = (history.iter().map(|p| p.period.year()).min(), history.last())
        else {
            return Err(FitError::EmptyHistory);
        };

        let (rows, ys): (Vec<Vec<f64>>, Vec<f64>) = history
            .iter()
            .filter_map(|p| {
                let v = p.value.filter(|v| v.is_finite())?;
                Some((vec![1.0, month_index(p, min_year)], v))
            })
            .unzip();
        if ys.len() < 2 {
            return Err(FitError::InsufficientData {
                required: 2,
                actual: ys.len(),
            });
        }

        let x = design_matrix(&rows).ok_or(FitError::Singular("trend design"))?;
        let y = DVector::from_vec(ys);
        let beta = solve_least_squares(&x, &y).ok_or(FitError::Singular("trend design"))?;
        let (intercept, slope) = (beta[0], beta[1]);

        let last_index = month_index(last, min_year);
        let forecast = (1..=horizon)
            .map(|h| intercept + slope * (last_index + h as f64))
            .collect();
        ensure_finite(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YearMonth;
    use crate::models::points_from;

    #[test]
    fn exact_line_is_extended_exactly() {
        // rate = 0.5 + 0.1 * index, index starts at 1 for January of min year.
        let start = YearMonth::new(2020, 1).unwrap();
        let values: Vec<Option<f64>> = (1..=24).map(|i| Some(0.5 + 0.1 * i as f64)).collect();
        let history = points_from(start, &values);

        let out = LinearTrendStrategy.fit_and_forecast(&history, 3).unwrap();
        assert_eq!(out.len(), 3);
        for (h, v) in out.iter().enumerate() {
            let expected = 0.5 + 0.1 * (25 + h) as f64;
            assert!((v - expected).abs() < 1e-9, "{v} vs {expected}");
        }
    }

    #[test]
    fn undefined_values_are_dropped_but_indices_kept() {
        let start = YearMonth::new(2021, 6).unwrap();
        // index(June 2021) = 6; rate = index
        let values = [Some(6.0), None, Some(8.0), None, Some(10.0)];
        let history = points_from(start, &values);
        let out = LinearTrendStrategy.fit_and_forecast(&history, 2).unwrap();
        assert!((out[0] - 11.0).abs() < 1e-9);
        assert!((out[1] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_histories_fail() {
        assert_eq!(LinearTrendStrategy.fit_and_forecast(&[], 3), Err(FitError::EmptyHistory));
        let start = YearMonth::new(2021, 6).unwrap();
        let history = points_from(start, &[Some(1.0), None]);
        assert_eq!(
            LinearTrendStrategy.fit_and_forecast(&history, 3),
            Err(FitError::InsufficientData { required: 2, actual: 1 })
        );
    }

    #[test]
    fn zero_horizon_yields_empty_forecast() {
        let start = YearMonth::new(2021, 1).unwrap();
        let history = points_from(start, &[Some(1.0), Some(2.0)]);
        assert!(LinearTrendStrategy.fit_and_forecast(&history, 0).unwrap().is_empty());
    }
}
