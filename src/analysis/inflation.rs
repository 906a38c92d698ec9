//! Month-over-month inflation from CPI observations.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Category, CpiObservation, InflationRecord};

/// `(curr - prev) / prev * 100`, or `None` when `prev` is exactly zero.
pub fn percent_change(prev: f64, curr: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}

/// Cleaned CPI table plus the duplicate rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct CleanedCpi {
    pub observations: Vec<CpiObservation>,
    pub duplicates: Vec<CpiObservation>,
}

/// Sort by `(category, period)` and keep the first row of each duplicate
/// `(category, period)` pair. The sort is stable, so "first" means first in
/// input order.
pub fn clean_observations(mut observations: Vec<CpiObservation>) -> CleanedCpi {
    observations.sort_by_key(|o| (o.category, o.period));
    let mut cleaned = CleanedCpi::default();
    for obs in observations {
        let duplicate = cleaned
            .observations
            .last()
            .is_some_and(|prev| prev.category == obs.category && prev.period == obs.period);
        if duplicate {
            cleaned.duplicates.push(obs);
        } else {
            cleaned.observations.push(obs);
        }
    }
    cleaned
}

#[derive(Debug, Clone, Default)]
pub struct InflationTable {
    pub records: Vec<InflationRecord>,
    /// Adjacent pairs skipped because a month was missing between them.
    pub gaps: usize,
}

/// Inflation records for every consecutive month pair, category by category.
///
/// `observations` must already be sorted by `(category, period)` (see
/// [`clean_observations`]). Pairs that are not consecutive months produce no
/// record.
pub fn calculate_inflation(observations: &[CpiObservation]) -> InflationTable {
    let mut by_category: BTreeMap<Category, Vec<&CpiObservation>> = BTreeMap::new();
    for obs in observations {
        by_category.entry(obs.category).or_default().push(obs);
    }

    let mut table = InflationTable::default();
    for (category, series) in by_category {
        let mut gaps = 0;
        for pair in series.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if !curr.period.follows(prev.period) {
                gaps += 1;
                continue;
            }
            table.records.push(InflationRecord {
                period: curr.period,
                category,
                inflation_rate: percent_change(prev.cpi, curr.cpi),
            });
        }
        if gaps > 0 {
            debug!(category = category.display_name(), gaps, "skipped non-consecutive months");
        }
        table.gaps += gaps;
    }
    table
}
