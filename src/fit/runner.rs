//! Per-category forecast runs.
//!
//! One strategy is fitted independently for every category (in parallel). A
//! category whose fit fails does not stop the batch: it yields a placeholder
//! of undefined values over its horizon and is reported in the run summary.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{Category, ForecastRecord, InflationRecord, ModelKind, YearMonth};
use crate::fit::horizon::forecast_periods;
use crate::models::{FitError, ForecastStrategy, SeriesPoint};

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Fitted(Vec<f64>),
    Failed { reason: FitError, horizon: usize },
}

impl ForecastOutcome {
    /// Forecast values; a failed outcome is `horizon` undefined values.
    pub fn values(&self) -> Vec<Option<f64>> {
        match self {
            ForecastOutcome::Fitted(values) => values.iter().copied().map(Some).collect(),
            ForecastOutcome::Failed { horizon, .. } => vec![None; *horizon],
        }
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, ForecastOutcome::Fitted(_))
    }
}

#[derive(Debug, Clone)]
pub struct CategoryForecast {
    pub category: Category,
    /// Number of history months the strategy saw.
    pub history_len: usize,
    pub periods: Vec<YearMonth>,
    pub outcome: ForecastOutcome,
}

#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub model: ModelKind,
    pub forecasts: Vec<CategoryForecast>,
}

impl ForecastRun {
    /// Flattened forecast table, category by category in run order.
    pub fn records(&self) -> Vec<ForecastRecord> {
        self.forecasts
            .iter()
            .flat_map(|f| {
                f.periods
                    .iter()
                    .zip(f.outcome.values())
                    .map(|(period, inflation_rate)| ForecastRecord {
                        period: period.first_day(),
                        category: f.category,
                        inflation_rate,
                    })
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(Category, &FitError)> {
        self.forecasts
            .iter()
            .filter_map(|f| match &f.outcome {
                ForecastOutcome::Failed { reason, .. } => Some((f.category, reason)),
                ForecastOutcome::Fitted(_) => None,
            })
            .collect()
    }
}

/// Chronological history of one category.
pub fn category_history(records: &[InflationRecord], category: Category) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = records
        .iter()
        .filter(|r| r.category == category)
        .map(|r| SeriesPoint {
            period: r.period,
            value: r.inflation_rate,
        })
        .collect();
    points.sort_by_key(|p| p.period);
    points
}

/// Fit one category and pair the result with its forecast months.
pub fn forecast_category(
    strategy: &dyn ForecastStrategy,
    history: &[SeriesPoint],
    category: Category,
    fallback_last: Option<YearMonth>,
    end: YearMonth,
) -> CategoryForecast {
    let last = history.last().map(|p| p.period).or(fallback_last);
    let periods = last.map(|l| forecast_periods(l, end)).unwrap_or_default();
    let horizon = periods.len();

    let fitted = strategy.fit_and_forecast(history, horizon).and_then(|values| {
        if values.len() == horizon {
            Ok(values)
        } else {
            Err(FitError::ForecastLength {
                expected: horizon,
                actual: values.len(),
            })
        }
    });
    let outcome = match fitted {
        Ok(values) => ForecastOutcome::Fitted(values),
        Err(reason) => {
            warn!(
                model = strategy.kind().slug(),
                category = category.display_name(),
                %reason,
                "forecast failed; writing placeholder values"
            );
            ForecastOutcome::Failed { reason, horizon }
        }
    };
    debug!(
        category = category.display_name(),
        history = history.len(),
        horizon,
        "category forecast done"
    );

    CategoryForecast {
        category,
        history_len: history.len(),
        periods,
        outcome,
    }
}

/// Forecast every category in `categories` through `end`.
///
/// A category's horizon starts after its own last historical month; a category
/// with no history uses the latest month across all categories.
pub fn forecast_categories(
    strategy: &dyn ForecastStrategy,
    inflation: &[InflationRecord],
    categories: &[Category],
    end: YearMonth,
) -> ForecastRun {
    let latest = inflation.iter().map(|r| r.period).max();

    let forecasts: Vec<CategoryForecast> = categories
        .par_iter()
        .map(|&category| {
            let history = category_history(inflation, category);
            forecast_category(strategy, &history, category, latest, end)
        })
        .collect();

    ForecastRun {
        model: strategy.kind(),
        forecasts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{strategy_for, LinearTrendStrategy};

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn rec(category: Category, period: YearMonth, rate: f64) -> InflationRecord {
        InflationRecord {
            period,
            category,
            inflation_rate: Some(rate),
        }
    }

    #[test]
    fn each_category_uses_its_own_last_period() {
        let mut inflation = Vec::new();
        for (i, p) in std::iter::once(ym(2030, 7)).chain(ym(2030, 7).following(2)).enumerate() {
            inflation.push(rec(Category::FoodAtHome, p, i as f64));
        }
        // Away-from-home stops one month earlier.
        inflation.push(rec(Category::FoodAwayFromHome, ym(2030, 7), 1.0));
        inflation.push(rec(Category::FoodAwayFromHome, ym(2030, 8), 2.0));

        let run = forecast_categories(
            &LinearTrendStrategy,
            &inflation,
            &[Category::FoodAwayFromHome, Category::FoodAtHome],
            ym(2030, 12),
        );
        assert_eq!(run.forecasts[0].periods.len(), 4);
        assert_eq!(run.forecasts[1].periods.len(), 3);
        assert!(run.failures().is_empty());
        assert_eq!(run.records().len(), 7);
    }

    #[test]
    fn failed_category_yields_placeholder_and_others_survive() {
        let inflation = vec![
            rec(Category::FoodAtHome, ym(2030, 9), 1.0),
            rec(Category::FoodAtHome, ym(2030, 10), 2.0),
            rec(Category::FoodAndBeverage, ym(2030, 10), 5.0),
        ];
        let run = forecast_categories(
            &LinearTrendStrategy,
            &inflation,
            &[Category::FoodAndBeverage, Category::FoodAtHome, Category::FoodAwayFromHome],
            ym(2030, 12),
        );

        let failures = run.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, Category::FoodAndBeverage);
        assert_eq!(*failures[1].1, FitError::EmptyHistory);

        // Empty category falls back to the global latest month.
        assert_eq!(run.forecasts[2].periods, vec![ym(2030, 11), ym(2030, 12)]);
        assert_eq!(run.forecasts[2].outcome.values(), vec![None, None]);

        let at_home = &run.forecasts[1];
        assert!(at_home.outcome.is_fitted());
        let values = at_home.outcome.values();
        assert!((values[0].unwrap() - 3.0).abs() < 1e-9);
        assert!((values[1].unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn every_model_yields_placeholder_for_empty_category() {
        let inflation: Vec<InflationRecord> = std::iter::once(ym(2027, 1))
            .chain(ym(2027, 1).following(47))
            .enumerate()
            .map(|(i, p)| rec(Category::FoodAtHome, p, 0.2 + 0.01 * i as f64))
            .collect();
        for kind in ModelKind::ALL {
            let strategy = strategy_for(kind);
            let run = forecast_categories(
                strategy.as_ref(),
                &inflation,
                &[Category::FoodAwayFromHome],
                ym(2031, 6),
            );
            let forecast = &run.forecasts[0];
            assert_eq!(forecast.periods.len(), 6, "{kind:?}");
            assert_eq!(forecast.outcome.values(), vec![None; 6], "{kind:?}");
            assert_eq!(
                forecast.outcome,
                ForecastOutcome::Failed {
                    reason: FitError::EmptyHistory,
                    horizon: 6,
                }
            );
        }
    }

    /// Returns one value fewer than asked for.
    struct ShortStrategy;

    impl ForecastStrategy for ShortStrategy {
        fn kind(&self) -> ModelKind {
            ModelKind::Linear
        }

        fn fit_and_forecast(&self, _history: &[SeriesPoint], horizon: usize) -> Result<Vec<f64>, FitError> {
            Ok(vec![1.0; horizon.saturating_sub(1)])
        }
    }

    #[test]
    fn wrong_length_forecast_is_a_failure() {
        let inflation = vec![rec(Category::FoodAtHome, ym(2030, 10), 1.0)];
        let run = forecast_categories(&ShortStrategy, &inflation, &[Category::FoodAtHome], ym(2030, 12));
        assert_eq!(
            run.forecasts[0].outcome,
            ForecastOutcome::Failed {
                reason: FitError::ForecastLength { expected: 2, actual: 1 },
                horizon: 2,
            }
        );
        assert_eq!(run.records().len(), 2);
        assert!(run.records().iter().all(|r| r.inflation_rate.is_none()));
    }

    #[test]
    fn history_past_end_gives_empty_horizon() {
        let inflation = vec![
            rec(Category::FoodAtHome, ym(2031, 1), 1.0),
            rec(Category::FoodAtHome, ym(2031, 2), 2.0),
        ];
        let run = forecast_categories(&LinearTrendStrategy, &inflation, &[Category::FoodAtHome], ym(2030, 12));
        assert!(run.records().is_empty());
        assert!(run.forecasts[0].outcome.is_fitted());
    }
}
