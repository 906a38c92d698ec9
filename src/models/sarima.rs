//! Seasonal ARIMA(1,1,1)(1,1,1,12).
//!
//! With `w = (1-B)(1-B^12) y` the multiplicative model is
//!
//! ```text
//! (1 - φB)(1 - ΦB^12) w_t = (1 + θB)(1 + ΘB^12) e_t
//! ```
//!
//! Coefficients are estimated by conditional sum of squares: residuals are
//! computed recursively with pre-sample values set to zero, and the squared
//! residuals from `t = 13` onward are summed. The four coefficients are
//! searched on a coarse product grid and then refined around the best
//! candidate. Candidates are evaluated in parallel; selection is the minimum
//! SSE with ties broken by grid index, so the result is deterministic.

use rayon::prelude::*;

use crate::domain::ModelKind;
use crate::math::{difference, linear_space, product_grid, refine_grid};
use crate::models::{carry_forward, ensure_finite, FitError, ForecastStrategy, SeriesPoint};

pub const SEASON: usize = 12;

/// `[φ, θ, Φ, Θ]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarimaCoefficients {
    pub ar: f64,
    pub ma: f64,
    pub seasonal_ar: f64,
    pub seasonal_ma: f64,
}

impl SarimaCoefficients {
    fn from_slice(v: &[f64]) -> Self {
        Self {
            ar: v[0],
            ma: v[1],
            seasonal_ar: v[2],
            seasonal_ma: v[3],
        }
    }

    fn ar_part(&self, w: &[f64], t: usize) -> f64 {
        let lag = |k: usize| if t >= k { w[t - k] } else { 0.0 };
        self.ar * lag(1) + self.seasonal_ar * lag(SEASON) - self.ar * self.seasonal_ar * lag(SEASON + 1)
    }

    fn ma_part(&self, e: &[f64], t: usize) -> f64 {
        let lag = |k: usize| if t >= k { e[t - k] } else { 0.0 };
        self.ma * lag(1) + self.seasonal_ma * lag(SEASON) + self.ma * self.seasonal_ma * lag(SEASON + 1)
    }

    /// Conditional residuals for the differenced series `w`.
    pub fn residuals(&self, w: &[f64]) -> Vec<f64> {
        let mut e = Vec::with_capacity(w.len());
        for t in 0..w.len() {
            let r = w[t] - self.ar_part(w, t) - self.ma_part(&e, t);
            e.push(r);
        }
        e
    }

    /// Conditional sum of squares from `t = SEASON + 1` onward.
    pub fn css(&self, w: &[f64]) -> f64 {
        self.residuals(w).iter().skip(SEASON + 1).map(|r| r * r).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SarimaStrategy {
    /// Coefficients are searched inside `(-bound, bound)`.
    pub bound: f64,
    pub coarse_steps: usize,
    pub refine_steps: usize,
    pub refine_rounds: usize,
}

impl Default for SarimaStrategy {
    fn default() -> Self {
        Self {
            bound: 0.98,
            coarse_steps: 7,
            refine_steps: 5,
            refine_rounds: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: Vec<f64>,
    sse: f64,
}

/// Pick the minimum SSE; break ties by original grid index.
fn best_candidate(grid: &[Vec<f64>], w: &[f64]) -> Option<Candidate> {
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, params)| {
            let sse = SarimaCoefficients::from_slice(params).css(w);
            sse.is_finite().then(|| Candidate {
                idx,
                params: params.clone(),
                sse,
            })
        })
        .collect();

    let mut iter = candidates.into_iter();
    let mut best = iter.next()?;
    for c in iter {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Some(best)
}

impl SarimaStrategy {
    /// Observations needed so that the doubly differenced series has two full
    /// seasons.
    pub fn min_observations(&self) -> usize {
        2 * SEASON + SEASON + 1
    }

    /// Doubly differenced series `(1-B)(1-B^12) y`.
    pub fn differenced(values: &[f64]) -> Vec<f64> {
        difference(&difference(values, 1), SEASON)
    }

    pub fn estimate(&self, w: &[f64]) -> Result<SarimaCoefficients, FitError> {
        let edge = self.bound * 0.9;
        let axis = linear_space(-edge, edge, self.coarse_steps);
        let coarse = product_grid(&[axis.clone(), axis.clone(), axis.clone(), axis]);
        let mut best = best_candidate(&coarse, w).ok_or(FitError::NonFinite)?;

        let mut half_width = if self.coarse_steps > 1 {
            2.0 * edge / (self.coarse_steps as f64 - 1.0)
        } else {
            edge
        };
        for _ in 0..self.refine_rounds {
            let grid = refine_grid(&best.params, half_width, self.refine_steps, edge);
            if let Some(c) = best_candidate(&grid, w) {
                if c.sse < best.sse {
                    best = c;
                }
            }
            half_width /= 2.0;
        }
        Ok(SarimaCoefficients::from_slice(&best.params))
    }
}

impl ForecastStrategy for SarimaStrategy {
    fn kind(&self) -> ModelKind {
        ModelKind::Sarima
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

        let w = Self::differenced(&values);
        let coeffs = self.estimate(&w)?;
        let mut e = coeffs.residuals(&w);

        let mut w_ext = w;
        let mut y = values;
        let n = y.len();
        for _ in 0..horizon {
            let t = w_ext.len();
            let next_w = coeffs.ar_part(&w_ext, t) + coeffs.ma_part(&e, t);
            w_ext.push(next_w);
            e.push(0.0);

            let m = y.len();
            let next_y = y[m - 1] + y[m - SEASON] - y[m - SEASON - 1] + next_w;
            y.push(next_y);
        }

        ensure_finite(y.split_off(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YearMonth;
    use crate::models::points_from;
    use std::f64::consts::PI;

    fn seasonal(t: usize) -> f64 {
        0.2 + 0.01 * t as f64 + 0.3 * (2.0 * PI * t as f64 / 12.0).sin()
    }

    fn fast() -> SarimaStrategy {
        SarimaStrategy {
            coarse_steps: 5,
            refine_steps: 3,
            refine_rounds: 1,
            ..SarimaStrategy::default()
        }
    }

    #[test]
    fn trend_plus_season_is_continued() {
        let values: Vec<Option<f64>> = (0..60).map(|t| Some(seasonal(t))).collect();
        let history = points_from(YearMonth::new(2015, 1).unwrap(), &values);
        let out = fast().fit_and_forecast(&history, 24).unwrap();
        assert_eq!(out.len(), 24);
        for (h, v) in out.iter().enumerate() {
            let expected = seasonal(60 + h);
            assert!((v - expected).abs() < 1e-6, "h={h}: {v} vs {expected}");
        }
    }

    #[test]
    fn css_vanishes_at_true_coefficients() {
        // w generated by w_t = 0.5 w_{t-1} + e_t with a single shock at t = 0.
        let mut w = vec![1.0];
        for _ in 1..40 {
            let prev = w[w.len() - 1];
            w.push(0.5 * prev);
        }
        let exact = SarimaCoefficients {
            ar: 0.5,
            ma: 0.0,
            seasonal_ar: 0.0,
            seasonal_ma: 0.0,
        };
        assert!(exact.css(&w) < 1e-20);
        let wrong = SarimaCoefficients { ar: -0.5, ..exact };
        assert!(wrong.css(&w) > exact.css(&w));
    }

    #[test]
    fn estimate_is_deterministic() {
        let values: Vec<f64> = (0..72)
            .map(|t| seasonal(t) + 0.05 * ((t * 37 % 11) as f64 - 5.0) / 5.0)
            .collect();
        let w = SarimaStrategy::differenced(&values);
        let a = fast().estimate(&w).unwrap();
        let b = fast().estimate(&w).unwrap();
        assert_eq!(a, b);
        for c in [a.ar, a.ma, a.seasonal_ar, a.seasonal_ma] {
            assert!(c.abs() < 0.98);
        }
    }

    #[test]
    fn short_history_is_rejected() {
        let values: Vec<Option<f64>> = (0..36).map(|t| Some(seasonal(t))).collect();
        let history = points_from(YearMonth::new(2015, 1).unwrap(), &values);
        assert_eq!(
            fast().fit_and_forecast(&history, 3),
            Err(FitError::InsufficientData { required: 37, actual: 36 })
        );
    }

    #[test]
    fn empty_or_undefined_history_is_rejected() {
        assert_eq!(fast().fit_and_forecast(&[], 3), Err(FitError::EmptyHistory));
        let history = points_from(YearMonth::new(2015, 1).unwrap(), &[None; 40]);
        assert_eq!(fast().fit_and_forecast(&history, 3), Err(FitError::EmptyHistory));
    }
}
