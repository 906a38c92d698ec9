//! CSV exports for every table the pipeline produces.
//!
//! Undefined rates are written as empty cells; periods use the same forms the
//! loaders in `ingest` accept, so every export can be read back.

use std::fs::File;
use std::path::Path;

use crate::analysis::{CogsPoint, EvaluationRow};
use crate::data::RawCpiRecord;
use crate::domain::{month_name, CpiObservation, ForecastRecord, InflationRecord, MergedRecord};
use crate::error::AppError;

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::input(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_table<I, R>(path: &Path, header: &[&str], rows: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = create_writer(path)?;
    let row_err = |e: csv::Error| AppError::input(format!("Failed to write '{}': {e}", path.display()));
    writer.write_record(header).map_err(row_err)?;
    for row in rows {
        writer.write_record(row).map_err(row_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush '{}': {e}", path.display())))
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_raw_cpi(path: &Path, raw: &[RawCpiRecord]) -> Result<(), AppError> {
    write_table(
        path,
        &["Series ID", "Year", "Period", "Value"],
        raw.iter()
            .map(|r| [r.series_id.clone(), r.year.to_string(), r.period.clone(), r.value.to_string()]),
    )
}

/// `Category,Year,Period,CPI` with the period as a month name.
pub fn write_cpi_table(path: &Path, observations: &[CpiObservation]) -> Result<(), AppError> {
    write_table(
        path,
        &["Category", "Year", "Period", "CPI"],
        observations.iter().map(|o| {
            [
                o.category.display_name().to_string(),
                o.period.year().to_string(),
                month_name(o.period.month()).unwrap_or_default().to_string(),
                o.cpi.to_string(),
            ]
        }),
    )
}

pub fn write_inflation_table(path: &Path, records: &[InflationRecord]) -> Result<(), AppError> {
    write_table(
        path,
        &["Period", "Category", "Inflation Rate"],
        records
            .iter()
            .map(|r| [r.period_label(), r.category.display_name().to_string(), opt(r.inflation_rate)]),
    )
}

pub fn write_forecast_table(path: &Path, records: &[ForecastRecord]) -> Result<(), AppError> {
    write_table(
        path,
        &["Period", "Category", "Inflation Rate"],
        records.iter().map(|r| {
            [
                r.period.format("%Y-%m-%d").to_string(),
                r.category.display_name().to_string(),
                opt(r.inflation_rate),
            ]
        }),
    )
}

/// Merged table; the historical/forecast source is not written.
pub fn write_merged_table(path: &Path, records: &[MergedRecord]) -> Result<(), AppError> {
    write_table(
        path,
        &["Period", "Category", "Inflation Rate"],
        records.iter().map(|r| {
            [
                r.period_label.clone(),
                r.category.display_name().to_string(),
                opt(r.inflation_rate),
            ]
        }),
    )
}

/// Rows that could not be scored keep their model/category with empty metrics.
pub fn write_metrics(path: &Path, rows: &[EvaluationRow]) -> Result<(), AppError> {
    write_table(
        path,
        &["Model", "Category", "MAE", "MSE", "RMSE", "Compared", "Skipped"],
        rows.iter().map(|r| {
            let cells = match &r.outcome {
                Ok(m) => [
                    m.mae.to_string(),
                    m.mse.to_string(),
                    m.rmse.to_string(),
                    m.compared.to_string(),
                    m.skipped.to_string(),
                ],
                Err(_) => Default::default(),
            };
            let [mae, mse, rmse, compared, skipped] = cells;
            [r.model.clone(), r.category.display_name().to_string(), mae, mse, rmse, compared, skipped]
        }),
    )
}

pub fn write_cogs_path(path: &Path, points: &[CogsPoint]) -> Result<(), AppError> {
    write_table(
        path,
        &["Period", "Inflation Rate", "Projected COGS", "Projected Gross Income"],
        points.iter().map(|p| {
            [
                p.period.label(),
                opt(p.rate),
                format!("{:.4}", p.cogs),
                format!("{:.4}", p.gross_income),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{merge_series, ForecastMetrics};
    use crate::domain::{Category, YearMonth};
    use crate::io::{load_cpi_table, load_forecast_table, load_inflation_table};
    use chrono::NaiveDate;

    #[test]
    fn inflation_and_merged_tables_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            InflationRecord {
                period: YearMonth::new(2024, 5).unwrap(),
                category: Category::FoodAtHome,
                inflation_rate: Some(0.125),
            },
            InflationRecord {
                period: YearMonth::new(2024, 6).unwrap(),
                category: Category::FoodAtHome,
                inflation_rate: None,
            },
        ];
        let forecast = vec![ForecastRecord {
            period: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            category: Category::FoodAtHome,
            inflation_rate: Some(-0.5),
        }];

        let inflation_path = dir.path().join("inflation.csv");
        write_inflation_table(&inflation_path, &records).unwrap();
        assert_eq!(load_inflation_table(&inflation_path).unwrap().rows, records);

        let forecast_path = dir.path().join("nested/forecast.csv");
        write_forecast_table(&forecast_path, &forecast).unwrap();
        assert_eq!(load_forecast_table(&forecast_path).unwrap().rows, forecast);

        let merged = merge_series(&records, &forecast);
        let merged_path = dir.path().join("predictive.csv");
        write_merged_table(&merged_path, &merged).unwrap();
        let back = load_inflation_table(&merged_path).unwrap();
        assert_eq!(back.rows.len(), 3);
        assert_eq!(back.rows[2].inflation_rate, Some(-0.5));

        let text = std::fs::read_to_string(&merged_path).unwrap();
        assert!(text.starts_with("Period,Category,Inflation Rate\n"));
        assert!(text.contains("June 2024,Food at home,\n"));
    }

    #[test]
    fn cpi_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpi.csv");
        let obs = vec![CpiObservation {
            category: Category::FoodAwayFromHome,
            period: YearMonth::new(2023, 9).unwrap(),
            cpi: 361.25,
        }];
        write_cpi_table(&path, &obs).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Food Away from home,2023,September,361.25"));
        assert_eq!(load_cpi_table(&path).unwrap().rows, obs);
    }

    #[test]
    fn failed_metrics_rows_have_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        let rows = vec![
            EvaluationRow {
                model: "ARIMA(5,1,0)".into(),
                category: Category::FoodAtHome,
                outcome: Ok(ForecastMetrics {
                    mae: 0.5,
                    mse: 0.25,
                    rmse: 0.5,
                    compared: 4,
                    skipped: 1,
                }),
            },
            EvaluationRow {
                model: "ARIMA(5,1,0)".into(),
                category: Category::FoodAndBeverage,
                outcome: Err(crate::analysis::EvalError::NoComparablePairs),
            },
        ];
        write_metrics(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Model,Category,MAE,MSE,RMSE,Compared,Skipped");
        assert_eq!(lines[1], "\"ARIMA(5,1,0)\",Food at home,0.5,0.25,0.5,4,1");
        assert_eq!(lines[2], "\"ARIMA(5,1,0)\",Food and Beverage,,,,,");
    }
}
