//! Supermarket sales dataset: the baseline prices fed to the projector.

use std::path::Path;

use crate::error::AppError;
use crate::io::{get_optional, get_required, load_rows, parse_f64, RowError};

pub const FOOD_PRODUCT_LINE: &str = "Food and beverages";

#[derive(Debug, Clone, PartialEq)]
pub struct SalesBaseline {
    /// Food and beverages rows used for the averages.
    pub rows: usize,
    pub average_total: f64,
    pub average_unit_price: f64,
    pub average_gross_margin_pct: f64,
}

#[derive(Debug, Clone)]
struct SaleRow {
    unit_price: f64,
    total: f64,
    gross_margin_pct: f64,
}

/// Load the sales CSV, keep the `Food and beverages` product line and average
/// its `Total`, `Unit price` and `gross margin percentage` columns.
pub fn load_sales_baseline(path: &Path) -> Result<(SalesBaseline, Vec<RowError>), AppError> {
    let loaded = load_rows(
        path,
        &["product line", "unit price", "total", "gross margin percentage"],
        |record, header_map| {
            let line = get_optional(record, header_map, "product line").unwrap_or_default();
            if !line.eq_ignore_ascii_case(FOOD_PRODUCT_LINE) {
                return Ok(None);
            }
            Ok(Some(SaleRow {
                unit_price: parse_f64(get_required(record, header_map, "unit price")?, "Unit price")?,
                total: parse_f64(get_required(record, header_map, "total")?, "Total")?,
                gross_margin_pct: parse_f64(
                    get_required(record, header_map, "gross margin percentage")?,
                    "gross margin percentage",
                )?,
            }))
        },
    )?;

    let n = loaded.rows.len();
    if n == 0 {
        return Err(AppError::no_data(format!(
            "No '{FOOD_PRODUCT_LINE}' rows in '{}'.",
            path.display()
        )));
    }
    let mean = |f: fn(&SaleRow) -> f64| loaded.rows.iter().map(f).sum::<f64>() / n as f64;
    let baseline = SalesBaseline {
        rows: n,
        average_total: mean(|r| r.total),
        average_unit_price: mean(|r| r.unit_price),
        average_gross_margin_pct: mean(|r| r.gross_margin_pct),
    };
    Ok((baseline, loaded.row_errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_averages_food_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "Invoice ID,Product line,Unit price,Quantity,Total,gross margin percentage\n\
             1,Food and beverages,10.0,2,21.0,4.761904762\n\
             2,Health and beauty,99.0,1,103.95,4.761904762\n\
             3,Food and beverages,30.0,1,31.5,4.761904762\n\
             4,Food and beverages,oops,1,31.5,4.761904762\n",
        )
        .unwrap();

        let (baseline, errors) = load_sales_baseline(&path).unwrap();
        assert_eq!(baseline.rows, 2);
        assert!((baseline.average_total - 26.25).abs() < 1e-12);
        assert!((baseline.average_unit_price - 20.0).abs() < 1e-12);
        assert!((baseline.average_gross_margin_pct - 4.761904762).abs() < 1e-12);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
    }

    #[test]
    fn no_food_rows_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "Product line,Unit price,Total,gross margin percentage\nSports and travel,1,1,5\n",
        )
        .unwrap();
        assert_eq!(load_sales_baseline(&path).unwrap_err().exit_code(), 3);
    }
}
