//! Shared domain types.
//!
//! Everything here is a small immutable value record. Records flow through the
//! pipeline in one direction:
//!
//! CPI observations -> inflation records -> forecast records -> merged series
//! -> evaluation metrics / price projections.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::domain::calendar::YearMonth;

/// First target year accepted by the price projector.
pub const MIN_PROJECTION_YEAR: i32 = 2014;
/// Last target year accepted by the price projector.
pub const MAX_PROJECTION_YEAR: i32 = 2030;
/// Year the supermarket sales baseline was observed in.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2019;
/// Forecasts run through December of this year.
pub const DEFAULT_HORIZON_END_YEAR: i32 = 2030;
/// First year requested from BLS.
pub const DEFAULT_START_YEAR: i32 = 2014;

/// CPI category registry.
///
/// Variants are declared in the lexical order of their labels so that the
/// derived `Ord` sorts merged output the same way a label sort would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Category {
    /// BLS `CUUR0000SEFV`.
    FoodAwayFromHome,
    /// BLS `CUUR0000SAF`.
    FoodAndBeverage,
    /// BLS `CUUR0000SAF11`.
    FoodAtHome,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::FoodAwayFromHome,
        Category::FoodAndBeverage,
        Category::FoodAtHome,
    ];

    /// Label used in every table this crate reads or writes.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::FoodAwayFromHome => "Food Away from home",
            Category::FoodAndBeverage => "Food and Beverage",
            Category::FoodAtHome => "Food at home",
        }
    }

    /// BLS CPI-U (not seasonally adjusted, U.S. city average) series id.
    pub fn series_id(self) -> &'static str {
        match self {
            Category::FoodAwayFromHome => "CUUR0000SEFV",
            Category::FoodAndBeverage => "CUUR0000SAF",
            Category::FoodAtHome => "CUUR0000SAF11",
        }
    }

    pub fn from_series_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|c| c.series_id().eq_ignore_ascii_case(id))
    }

    /// Case-insensitive label lookup; BLS series ids are accepted too.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(label))
            .or_else(|| Self::from_series_id(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Forecast strategy selector. Exactly one runs per forecast invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ModelKind {
    /// SARIMA(1,1,1)(1,1,1,12).
    Sarima,
    /// ARIMA(5,1,0).
    Arima,
    /// OLS trend on month index.
    Linear,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Sarima, ModelKind::Arima, ModelKind::Linear];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Sarima => "SARIMA(1,1,1)(1,1,1,12)",
            ModelKind::Arima => "ARIMA(5,1,0)",
            ModelKind::Linear => "Linear trend",
        }
    }

    /// Lowercase tag used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            ModelKind::Sarima => "sarima",
            ModelKind::Arima => "arima",
            ModelKind::Linear => "linreg",
        }
    }
}

/// One monthly CPI reading.
#[derive(Debug, Clone, PartialEq)]
pub struct CpiObservation {
    pub category: Category,
    pub period: YearMonth,
    pub cpi: f64,
}

/// Month-over-month inflation for `period` relative to the month before.
///
/// `inflation_rate` is `None` when the prior CPI value is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationRecord {
    pub period: YearMonth,
    pub category: Category,
    pub inflation_rate: Option<f64>,
}

impl InflationRecord {
    pub fn period_label(&self) -> String {
        self.period.label()
    }
}

/// A forecasted month. `inflation_rate` is `None` only for placeholder rows
/// produced when the category's model could not be fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub period: NaiveDate,
    pub category: Category,
    pub inflation_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    Historical,
    Forecast,
}

/// One row of the merged historical + forecast table.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub period: NaiveDate,
    pub period_label: String,
    pub category: Category,
    pub inflation_rate: Option<f64>,
    pub source: SeriesSource,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    /// Categories to forecast, in output order.
    pub categories: Vec<Category>,
    /// Last forecasted month (inclusive).
    pub horizon_end: YearMonth,
    pub valid_years: RangeInclusive<i32>,
    pub reference_year: i32,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl PipelineConfig {
    pub fn raw_cpi_path(&self) -> PathBuf {
        self.data_dir.join("food_cpi_data.csv")
    }

    pub fn cpi_path(&self) -> PathBuf {
        self.data_dir.join("transformed_food_cpi_data.csv")
    }

    pub fn inflation_path(&self) -> PathBuf {
        self.data_dir.join("inflation.csv")
    }

    pub fn forecast_path(&self) -> PathBuf {
        self.data_dir.join("forecasted_inflation.csv")
    }

    /// Merged table of the most recent forecast run.
    pub fn predictive_path(&self) -> PathBuf {
        self.data_dir.join("predictive_inflation.csv")
    }

    /// Merged table kept per model for later evaluation.
    pub fn predictive_path_for(&self, kind: ModelKind) -> PathBuf {
        self.data_dir.join(format!("predictive_inflation_{}.csv", kind.slug()))
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.data_dir.join("metrics.csv")
    }

    pub fn sales_path(&self) -> PathBuf {
        self.data_dir.join("supermarket_sales.csv")
    }

    pub fn cogs_path(&self) -> PathBuf {
        self.data_dir.join("projected_cogs.csv")
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            categories: Category::ALL.to_vec(),
            horizon_end: YearMonth::new(DEFAULT_HORIZON_END_YEAR, 12)
                .unwrap_or_else(|| YearMonth::from_date(NaiveDate::MAX)),
            valid_years: MIN_PROJECTION_YEAR..=MAX_PROJECTION_YEAR,
            reference_year: DEFAULT_REFERENCE_YEAR,
            plot: false,
            plot_width: 100,
            plot_height: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_matches_label_order() {
        let mut by_label = Category::ALL.to_vec();
        by_label.sort_by_key(|c| c.display_name());
        let mut by_ord = Category::ALL.to_vec();
        by_ord.sort();
        assert_eq!(by_label, by_ord);
    }

    #[test]
    fn category_lookups() {
        assert_eq!(Category::from_label("food at home"), Some(Category::FoodAtHome));
        assert_eq!(Category::from_label("CUUR0000SAF"), Some(Category::FoodAndBeverage));
        assert_eq!(Category::from_series_id("CUUR0000SEFV"), Some(Category::FoodAwayFromHome));
        assert_eq!(Category::from_label("Energy"), None);
    }

    #[test]
    fn per_model_paths_are_distinct() {
        let config = PipelineConfig::default();
        let paths: Vec<_> = ModelKind::ALL.iter().map(|k| config.predictive_path_for(*k)).collect();
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
        assert!(paths[2].ends_with("predictive_inflation_linreg.csv"));
    }
}
