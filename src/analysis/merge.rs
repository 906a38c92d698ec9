//! Historical + forecast series merge.
//!
//! Both inputs are mapped onto month-start dates, concatenated and
//! stable-sorted by `(category, date)`; periods are then re-rendered as
//! `"<Month> <YYYY>"`. Every input record appears exactly once in the output.

use std::path::Path;

use crate::domain::{ForecastRecord, InflationRecord, MergedRecord, SeriesSource, YearMonth};
use crate::error::AppError;
use crate::io::{load_forecast_table, load_inflation_table, RowError};

pub fn merge_series(historical: &[InflationRecord], forecast: &[ForecastRecord]) -> Vec<MergedRecord> {
    let hist = historical.iter().map(|r| MergedRecord {
        period: r.period.first_day(),
        period_label: r.period.label(),
        category: r.category,
        inflation_rate: r.inflation_rate,
        source: SeriesSource::Historical,
    });
    let fc = forecast.iter().map(|r| MergedRecord {
        period: r.period,
        period_label: YearMonth::from_date(r.period).label(),
        category: r.category,
        inflation_rate: r.inflation_rate,
        source: SeriesSource::Forecast,
    });

    let mut merged: Vec<MergedRecord> = hist.chain(fc).collect();
    merged.sort_by_key(|r| (r.category, r.period));
    merged
}

/// Merge a historical inflation CSV (`"<Month> <YYYY>"` periods) with a
/// forecast CSV (`YYYY-MM-DD` periods). Row-level problems from either file
/// are returned alongside the merged rows.
pub fn merge_tables(
    historical_path: &Path,
    forecast_path: &Path,
) -> Result<(Vec<MergedRecord>, Vec<RowError>), AppError> {
    let historical = load_inflation_table(historical_path)?;
    let forecast = load_forecast_table(forecast_path)?;
    let mut errors = historical.row_errors;
    errors.extend(forecast.row_errors);
    Ok((merge_series(&historical.rows, &forecast.rows), errors))
}
