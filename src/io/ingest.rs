//! CSV ingest and normalization.
//!
//! Turns the pipeline's CSV tables back into typed records.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Header tolerance**: case-insensitive names, BOM stripped

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{
    parse_period_field, parse_timestamp, Category, CpiObservation, ForecastRecord, InflationRecord, YearMonth,
};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Rows parsed from one table plus the rows that were rejected.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub(crate) type HeaderMap = HashMap<String, usize>;

pub(crate) fn open_reader(path: &Path) -> Result<(csv::Reader<File>, HeaderMap), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();

    Ok((reader, build_header_map(&headers)))
}

fn build_header_map(headers: &StringRecord) -> HeaderMap {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

pub(crate) fn ensure_columns(header_map: &HeaderMap, required: &[&str], path: &Path) -> Result<(), AppError> {
    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::input(format!(
                "Missing required column `{name}` in '{}'.",
                path.display()
            )));
        }
    }
    Ok(())
}

pub(crate) fn get_required<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

pub(crate) fn get_optional<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_f64(raw: &str, name: &str) -> Result<f64, String> {
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}' in `{name}`"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{raw}' in `{name}`"))
    }
}

/// Empty cell -> undefined; anything else must be a finite number.
fn parse_rate(record: &StringRecord, header_map: &HeaderMap) -> Result<Option<f64>, String> {
    get_optional(record, header_map, "inflation rate")
        .map(|raw| parse_f64(raw, "Inflation Rate"))
        .transpose()
}

fn parse_category(record: &StringRecord, header_map: &HeaderMap) -> Result<Category, String> {
    let raw = get_required(record, header_map, "category")?;
    Category::from_label(raw).ok_or_else(|| format!("Unknown category '{raw}'"))
}

/// Read every row of `path` through `parse_row`, collecting row errors.
pub(crate) fn load_rows<T>(
    path: &Path,
    required: &[&str],
    parse_row: impl Fn(&StringRecord, &HeaderMap) -> Result<Option<T>, String>,
) -> Result<Loaded<T>, AppError> {
    let (mut reader, header_map) = open_reader(path)?;
    ensure_columns(&header_map, required, path)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines and the header row.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {} // filtered out
            Err(message) => row_errors.push(RowError {
                line,
                id: get_optional(&record, &header_map, "category").map(str::to_string),
                message,
            }),
        }
    }

    Ok(Loaded {
        rows,
        row_errors,
        rows_read,
    })
}

/// Load a `Category,Year,Period,CPI` table.
///
/// `Period` may be a month name, a BLS code (`M01`) or a number. Rows whose
/// period is not a calendar month (e.g. `M13`) are rejected.
pub fn load_cpi_table(path: &Path) -> Result<Loaded<CpiObservation>, AppError> {
    let loaded = load_rows(path, &["category", "year", "period", "cpi"], |record, header_map| {
        let category = parse_category(record, header_map)?;
        let year_raw = get_required(record, header_map, "year")?;
        let year = year_raw
            .parse::<i32>()
            .map_err(|_| format!("Invalid year '{year_raw}'"))?;
        let period_raw = get_required(record, header_map, "period")?;
        let month = parse_period_field(period_raw).ok_or_else(|| format!("Invalid period '{period_raw}'"))?;
        let period = YearMonth::new(year, month).ok_or_else(|| format!("Invalid date {year}-{month}"))?;
        let cpi = parse_f64(get_required(record, header_map, "cpi")?, "CPI")?;
        Ok(Some(CpiObservation { category, period, cpi }))
    })?;

    if loaded.rows.is_empty() {
        return Err(AppError::no_data(format!(
            "No valid CPI rows in '{}'.",
            path.display()
        )));
    }
    Ok(loaded)
}

/// Load a `Period,Category,Inflation Rate` table with `"<Month> <YYYY>"` periods.
pub fn load_inflation_table(path: &Path) -> Result<Loaded<InflationRecord>, AppError> {
    load_rows(path, &["period", "category", "inflation rate"], |record, header_map| {
        let raw = get_required(record, header_map, "period")?;
        let period = YearMonth::parse_label(raw).ok_or_else(|| format!("Invalid period label '{raw}'"))?;
        Ok(Some(InflationRecord {
            period,
            category: parse_category(record, header_map)?,
            inflation_rate: parse_rate(record, header_map)?,
        }))
    })
}

/// Load a `Period,Category,Inflation Rate` table with `YYYY-MM-DD` periods
/// (an optional time suffix is ignored).
pub fn load_forecast_table(path: &Path) -> Result<Loaded<ForecastRecord>, AppError> {
    load_rows(path, &["period", "category", "inflation rate"], |record, header_map| {
        let raw = get_required(record, header_map, "period")?;
        let period = parse_timestamp(raw).ok_or_else(|| format!("Invalid timestamp '{raw}'"))?;
        Ok(Some(ForecastRecord {
            period,
            category: parse_category(record, header_map)?,
            inflation_rate: parse_rate(record, header_map)?,
        }))
    })
}
