//! ARIMA(p, d, 0) without a constant.
//!
//! The series is differenced `d` times, AR(p) coefficients are estimated by
//! least squares on the differenced values, forecasts recurse the AR equation
//! and are integrated back from the last observed level.

use nalgebra::DVector;

use crate::domain::ModelKind;
use crate::math::{design_matrix, difference_n, solve_least_squares, undifference};
use crate::models::{carry_forward, ensure_finite, FitError, ForecastStrategy, SeriesPoint};

#[derive(Debug, Clone, Copy)]
pub struct ArimaStrategy {
    pub p: usize,
    pub d: usize,
}

impl Default for ArimaStrategy {
    fn default() -> Self {
        Self { p: 5, d: 1 }
    }
}

impl ArimaStrategy {
    /// Minimum number of observations on the original scale.
    pub fn min_observations(&self) -> usize {
        2 * self.p + 1 + self.d
    }

    /// AR coefficients `a_1..a_p` for `w_t = Σ a_i w_{t-i}`.
    pub fn estimate_ar(&self, w: &[f64]) -> Result<Vec<f64>, FitError> {
        let p = self.p;
        if p == 0 {
            return Ok(Vec::new());
        }
        let rows: Vec<Vec<f64>> = (p..w.len())
            .map(|t| (1..=p).map(|lag| w[t - lag]).collect())
            .collect();
        let x = design_matrix(&rows).ok_or(FitError::Singular("AR design"))?;
        let y = DVector::from_iterator(w.len() - p, w[p..].iter().copied());
        let beta = solve_least_squares(&x, &y).ok_or(FitError::Singular("AR design"))?;
        Ok(beta.iter().copied().collect())
    }
}

impl ForecastStrategy for ArimaStrategy {
    fn kind(&self) -> ModelKind {
        ModelKind::Arima
    }

    fn fit_and_forecast(&self, history: &[SeriesPoint], horizon: usize) -> Result<Vec<f64>, FitError> {
        let values = carry_forward(history);
        if values.is_empty() {
            return Err(FitError::EmptyHistory);
        }
        let required = self.min_observations();
        if values.len() < required {
            return Err(FitError::InsufficientData {
                required,
                actual: values.len(),
            });
        }

        let w = difference_n(&values, self.d);
        let coeffs = self.estimate_ar(&w)?;

        let mut extended = w;
        let mut forecast_w = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let n = extended.len();
            let next: f64 = coeffs.iter().enumerate().map(|(i, a)| a * extended[n - 1 - i]).sum();
            extended.push(next);
            forecast_w.push(next);
        }

        ensure_finite(undifference(&values, self.d, &forecast_w))
    }
}
