//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays free of presentation concerns
//! - output changes are localized (and covered by snapshot-style tests)

use crate::analysis::{CleanedCpi, CogsPoint, EvaluationRow, InflationTable};
use crate::data::SalesBaseline;
use crate::domain::{Category, ModelKind};
use crate::fit::{ForecastOutcome, ForecastRun};
use crate::io::RowError;

/// Summary of the CPI -> inflation stage.
pub fn format_inflation_summary(cleaned: &CleanedCpi, table: &InflationTable) -> String {
    let mut out = String::new();
    out.push_str("=== cpi - Inflation ===\n");
    out.push_str(&format!(
        "CPI rows: {} | duplicates dropped: {} | gaps skipped: {}\n",
        cleaned.observations.len(),
        cleaned.duplicates.len(),
        table.gaps
    ));
    for category in Category::ALL {
        let rates: Vec<f64> = table
            .records
            .iter()
            .filter(|r| r.category == category)
            .filter_map(|r| r.inflation_rate)
            .collect();
        let count = table.records.iter().filter(|r| r.category == category).count();
        if count == 0 {
            continue;
        }
        let mean = if rates.is_empty() {
            f64::NAN
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };
        out.push_str(&format!(
            "  {:<22} months={:>4} mean={:>8.4}%\n",
            category.display_name(),
            count,
            mean
        ));
    }
    out
}

/// Per-category forecast status for one strategy run.
pub fn format_forecast_summary(run: &ForecastRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== cpi - Forecast ({}) ===\n", run.model.display_name()));
    out.push_str(
        format!(
            "{:<22} {:>8} {:>8} {:<15} {:<15} {:>10}\n",
            "category", "history", "horizon", "from", "to", "last"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<22} {:-<8} {:-<8} {:-<15} {:-<15} {:-<10}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for f in &run.forecasts {
        let from = f.periods.first().map(|p| p.label()).unwrap_or_default();
        let to = f.periods.last().map(|p| p.label()).unwrap_or_default();
        let last = match &f.outcome {
            ForecastOutcome::Fitted(values) => values.last().map(|v| format!("{v:.4}")).unwrap_or_default(),
            ForecastOutcome::Failed { .. } => "failed".to_string(),
        };
        out.push_str(
            format!(
                "{:<22} {:>8} {:>8} {:<15} {:<15} {:>10}\n",
                truncate(f.category.display_name(), 22),
                f.history_len,
                f.periods.len(),
                from,
                to,
                last
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let failures = run.failures();
    if !failures.is_empty() {
        out.push_str("\nFailed categories (placeholder rows written):\n");
        for (category, reason) in failures {
            out.push_str(&format!("  - {}: {reason}\n", category.display_name()));
        }
    }
    out
}

pub fn format_metrics(rows: &[EvaluationRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:<22} {:>10} {:>10} {:>10} {:>5}\n",
            "model", "category", "MAE", "MSE", "RMSE", "n"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<22} {:-<10} {:-<10} {:-<10} {:-<5}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        let line = match &r.outcome {
            Ok(m) => format!(
                "{:<24} {:<22} {:>10.4} {:>10.4} {:>10.4} {:>5}",
                truncate(&r.model, 24),
                truncate(r.category.display_name(), 22),
                m.mae,
                m.mse,
                m.rmse,
                m.compared
            ),
            Err(e) => format!(
                "{:<24} {:<22} {e}",
                truncate(&r.model, 24),
                truncate(r.category.display_name(), 22)
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn format_price_projection(
    baseline: &SalesBaseline,
    category: Category,
    reference_year: i32,
    target_year: i32,
    total: f64,
    unit_price: f64,
) -> String {
    let mut out = String::new();
    out.push_str("=== cpi - Price projection ===\n");
    out.push_str(&format!(
        "Baseline: {} food rows, {reference_year} averages (total={:.2}, unit price={:.2})\n",
        baseline.rows, baseline.average_total, baseline.average_unit_price
    ));
    out.push_str(&format!("Inflation series: {}\n", category.display_name()));
    out.push_str(&format!("Projected {target_year} average total:      {total:.2}\n"));
    out.push_str(&format!("Projected {target_year} average unit price: {unit_price:.2}\n"));
    out
}

pub fn format_cogs_summary(points: &[CogsPoint], margin_pct: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== cpi - COGS path (gross margin {margin_pct:.3}%) ===\n"));
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        out.push_str("(empty path)\n");
        return out;
    };
    for p in [first, last] {
        out.push_str(&format!(
            "  {:<15} cogs={:>12.2} gross income={:>12.2}\n",
            p.period.label(),
            p.cogs,
            p.gross_income
        ));
    }
    out
}

/// First `max` row errors, then a count of the rest.
pub fn format_row_errors(errors: &[RowError], max: usize) -> String {
    let mut out = String::new();
    if errors.is_empty() {
        return out;
    }
    out.push_str(&format!("Skipped rows: {}\n", errors.len()));
    for e in errors.iter().take(max) {
        match &e.id {
            Some(id) => out.push_str(&format!("  line {} ({}): {}\n", e.line, id, e.message)),
            None => out.push_str(&format!("  line {}: {}\n", e.line, e.message)),
        }
    }
    if errors.len() > max {
        out.push_str(&format!("  ... and {} more\n", errors.len() - max));
    }
    out
}

/// Numbered model menu used by the interactive picker.
pub fn format_model_menu() -> String {
    let mut out = String::new();
    for (i, kind) in ModelKind::ALL.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, kind.display_name()));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EvalError, ForecastMetrics};
    use crate::domain::YearMonth;
    use crate::fit::CategoryForecast;
    use crate::models::FitError;

    #[test]
    fn metrics_table_layout() {
        let rows = vec![
            EvaluationRow {
                model: "Linear trend".into(),
                category: Category::FoodAtHome,
                outcome: Ok(ForecastMetrics {
                    mae: 0.1,
                    mse: 0.02,
                    rmse: 0.141421,
                    compared: 12,
                    skipped: 0,
                }),
            },
            EvaluationRow {
                model: "Linear trend".into(),
                category: Category::FoodAndBeverage,
                outcome: Err(EvalError::NoComparablePairs),
            },
        ];
        let text = format_metrics(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "model                    category                      MAE        MSE       RMSE     n"
        );
        assert_eq!(
            lines[2],
            "Linear trend             Food at home               0.1000     0.0200     0.1414    12"
        );
        assert!(lines[3].starts_with("Linear trend             Food and Beverage      no comparable pairs"));
    }

    #[test]
    fn forecast_summary_lists_failures() {
        let run = ForecastRun {
            model: ModelKind::Arima,
            forecasts: vec![CategoryForecast {
                category: Category::FoodAtHome,
                history_len: 3,
                periods: vec![YearMonth::new(2030, 12).unwrap()],
                outcome: ForecastOutcome::Failed {
                    reason: FitError::InsufficientData { required: 12, actual: 3 },
                    horizon: 1,
                },
            }],
        };
        let text = format_forecast_summary(&run);
        assert!(text.starts_with("=== cpi - Forecast (ARIMA(5,1,0)) ===\n"));
        assert!(text.contains("December 2030"));
        assert!(text.contains("  - Food at home: need at least 12 usable observations, got 3\n"));
    }

    #[test]
    fn row_errors_are_capped() {
        let errors: Vec<RowError> = (0..5)
            .map(|i| RowError {
                line: i + 2,
                id: None,
                message: "bad".into(),
            })
            .collect();
        let text = format_row_errors(&errors, 2);
        assert!(text.ends_with("  ... and 3 more\n"));
        assert_eq!(format_row_errors(&[], 2), "");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Food Away from home", 10), "Food Away.");
        assert_eq!(truncate("short", 10), "short");
    }
}
