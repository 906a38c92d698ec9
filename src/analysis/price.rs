//! Price projection from monthly inflation.
//!
//! A baseline price observed in a reference year is moved to a target year by
//! folding over monthly rates in chronological order: months before the
//! reference year deflate, months from the reference year on inflate, and only
//! months up to the target year take part. The same inputs always give the
//! same result; nothing is carried between calls.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::domain::{InflationRecord, YearMonth};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("year {year} is outside the supported range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
    #[error("month {0} is not in 1..=12")]
    MonthOutOfRange(u32),
    #[error("{0} is not covered by the inflation series")]
    AnchorNotInSeries(String),
    #[error("gross margin {0}% must be below 100%")]
    MarginTooHigh(f64),
}

/// A monthly rate in percent. `None` rates are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRecord {
    pub year: i32,
    pub month: u32,
    pub rate: Option<f64>,
}

impl From<&InflationRecord> for RateRecord {
    fn from(r: &InflationRecord) -> Self {
        Self {
            year: r.period.year(),
            month: r.period.month(),
            rate: r.inflation_rate,
        }
    }
}

/// Growth factor of a monthly rate. A rate of -100% or below has no usable
/// factor and is treated like an undefined rate.
fn growth(rate: f64) -> Option<f64> {
    let factor = 1.0 + rate / 100.0;
    (factor.is_finite() && factor > 0.0).then_some(factor)
}

#[derive(Debug, Clone)]
pub struct PriceProjector {
    pub reference_year: i32,
    pub valid_years: RangeInclusive<i32>,
}

impl PriceProjector {
    pub fn new(reference_year: i32, valid_years: RangeInclusive<i32>) -> Self {
        Self {
            reference_year,
            valid_years,
        }
    }

    pub fn check_year(&self, year: i32) -> Result<(), ProjectionError> {
        if self.valid_years.contains(&year) {
            Ok(())
        } else {
            Err(ProjectionError::YearOutOfRange {
                year,
                min: *self.valid_years.start(),
                max: *self.valid_years.end(),
            })
        }
    }

    /// Project `baseline` (observed in the reference year) to `target_year`.
    ///
    /// `records` must be chronological.
    pub fn project(&self, baseline: f64, records: &[RateRecord], target_year: i32) -> Result<f64, ProjectionError> {
        self.check_year(target_year)?;
        let projected = records
            .iter()
            .filter(|r| r.year <= target_year)
            .filter_map(|r| r.rate.and_then(growth).map(|factor| (r.year, factor)))
            .fold(baseline, |price, (year, factor)| {
                if year < self.reference_year {
                    price / factor
                } else {
                    price * factor
                }
            });
        Ok(projected)
    }
}

/// One month of a projected cost-of-goods path.
#[derive(Debug, Clone, PartialEq)]
pub struct CogsPoint {
    pub period: YearMonth,
    pub rate: Option<f64>,
    pub cogs: f64,
    pub gross_income: f64,
}

/// Gross income implied by `cogs` at a gross margin of `margin_pct` percent.
pub fn gross_income(cogs: f64, margin_pct: f64) -> f64 {
    let m = margin_pct / 100.0;
    cogs * m / (1.0 - m)
}

/// Monthly COGS path over `series`, equal to `initial` at `anchor`.
///
/// A month's rate describes the change from the previous month. Moving forward
/// from the anchor each month multiplies by its own growth factor; moving
/// backward each step divides by the growth factor of the month after it.
/// Undefined rates (and rates of -100% or below) count as no change.
pub fn project_cogs_path(
    initial: f64,
    anchor: YearMonth,
    series: &[RateRecord],
    margin_pct: f64,
) -> Result<Vec<CogsPoint>, ProjectionError> {
    if margin_pct >= 100.0 {
        return Err(ProjectionError::MarginTooHigh(margin_pct));
    }
    let periods: Vec<Option<YearMonth>> = series.iter().map(|r| YearMonth::new(r.year, r.month)).collect();
    let anchor_idx = periods
        .iter()
        .position(|p| *p == Some(anchor))
        .ok_or_else(|| ProjectionError::AnchorNotInSeries(anchor.label()))?;

    let factor = |i: usize| series[i].rate.and_then(growth).unwrap_or(1.0);
    let mut cogs = vec![0.0; series.len()];
    cogs[anchor_idx] = initial;
    for i in anchor_idx + 1..series.len() {
        cogs[i] = cogs[i - 1] * factor(i);
    }
    for i in (0..anchor_idx).rev() {
        cogs[i] = cogs[i + 1] / factor(i + 1);
    }

    Ok(series
        .iter()
        .zip(periods)
        .zip(cogs)
        .filter_map(|((r, period), cogs)| {
            Some(CogsPoint {
                period: period?,
                rate: r.rate,
                cogs,
                gross_income: gross_income(cogs, margin_pct),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> PriceProjector {
        PriceProjector::new(2019, 2014..=2030)
    }

    fn rec(year: i32, month: u32, rate: f64) -> RateRecord {
        RateRecord {
            year,
            month,
            rate: Some(rate),
        }
    }

    #[test]
    fn deflates_before_reference_and_inflates_after() {
        let records = [rec(2018, 6, 10.0), rec(2020, 6, 5.0)];
        let p = projector();

        let y2018 = p.project(100.0, &records, 2018).unwrap();
        assert!((y2018 - 100.0 / 1.1).abs() < 1e-9);

        let y2020 = p.project(100.0, &records, 2020).unwrap();
        assert!((y2020 - 100.0 / 1.1 * 1.05).abs() < 1e-9);

        // 2019 itself has no records; only the 2018 deflation applies.
        let y2019 = p.project(100.0, &records, 2019).unwrap();
        assert!((y2019 - y2018).abs() < 1e-12);
    }

    #[test]
    fn projection_is_stateless() {
        let records = [rec(2019, 1, 1.0), rec(2019, 2, 2.0)];
        let p = projector();
        let a = p.project(50.0, &records, 2025).unwrap();
        let b = p.project(50.0, &records, 2025).unwrap();
        assert_eq!(a, b);
        assert!((a - 50.0 * 1.01 * 1.02).abs() < 1e-12);
    }

    #[test]
    fn undefined_rates_are_skipped() {
        let records = [RateRecord { year: 2020, month: 1, rate: None }, rec(2020, 2, 10.0)];
        let v = projector().project(10.0, &records, 2020).unwrap();
        assert!((v - 11.0).abs() < 1e-12);
    }

    #[test]
    fn total_collapse_rate_is_skipped() {
        let p = projector();
        let records = [rec(2018, 6, -100.0), rec(2020, 6, 5.0), rec(2021, 1, -150.0)];
        let out = p.project(100.0, &records, 2021).unwrap();
        assert!((out - 105.0).abs() < 1e-9);

        let series = [rec(2021, 1, 1.0), rec(2021, 2, -100.0), rec(2021, 3, 2.0)];
        let anchor = YearMonth::new(2021, 3).unwrap();
        let path = project_cogs_path(1000.0, anchor, &series, 4.0).unwrap();
        assert!(path.iter().all(|pt| pt.cogs.is_finite()));
        assert!((path[1].cogs - 1000.0 / 1.02).abs() < 1e-9);
        assert!((path[0].cogs - path[1].cogs).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_years_are_rejected() {
        let p = projector();
        assert_eq!(
            p.project(1.0, &[], 2031),
            Err(ProjectionError::YearOutOfRange { year: 2031, min: 2014, max: 2030 })
        );
        assert!(p.project(1.0, &[], 2013).is_err());
        assert_eq!(p.project(1.0, &[], 2014), Ok(1.0));
    }

    #[test]
    fn cogs_path_is_anchored() {
        let series = [rec(2020, 1, 10.0), rec(2020, 2, 10.0), rec(2020, 3, 5.0), rec(2020, 4, 0.0)];
        let anchor = YearMonth::new(2020, 2).unwrap();
        let path = project_cogs_path(110.0, anchor, &series, 20.0).unwrap();

        assert_eq!(path.len(), 4);
        assert!((path[1].cogs - 110.0).abs() < 1e-12);
        assert!((path[0].cogs - 100.0).abs() < 1e-9);
        assert!((path[2].cogs - 115.5).abs() < 1e-9);
        assert!((path[3].cogs - 115.5).abs() < 1e-9);
        assert!((path[1].gross_income - 27.5).abs() < 1e-9);
    }

    #[test]
    fn cogs_anchor_must_be_in_series() {
        let series = [rec(2020, 1, 1.0)];
        let anchor = YearMonth::new(2021, 1).unwrap();
        assert_eq!(
            project_cogs_path(1.0, anchor, &series, 10.0),
            Err(ProjectionError::AnchorNotInSeries("January 2021".into()))
        );
        assert!(project_cogs_path(1.0, YearMonth::new(2020, 1).unwrap(), &series, 100.0).is_err());
    }
}
