//! Forecast horizon arithmetic.

use crate::domain::YearMonth;

/// Months from `last` (exclusive) through `end` (inclusive), clamped at 0.
pub fn horizon_months(last: YearMonth, end: YearMonth) -> usize {
    usize::try_from(last.months_until(end)).unwrap_or(0)
}

/// The forecast months `last+1 ..= end`.
pub fn forecast_periods(last: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    last.following(horizon_months(last, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn horizon_counts_calendar_months() {
        assert_eq!(horizon_months(ym(2024, 6), ym(2030, 12)), 78);
        assert_eq!(horizon_months(ym(2030, 11), ym(2030, 12)), 1);
        assert_eq!(horizon_months(ym(2030, 12), ym(2030, 12)), 0);
        assert_eq!(horizon_months(ym(2031, 3), ym(2030, 12)), 0);
    }

    #[test]
    fn periods_run_through_end_inclusive() {
        let periods = forecast_periods(ym(2030, 10), ym(2030, 12));
        assert_eq!(periods, vec![ym(2030, 11), ym(2030, 12)]);
        assert!(forecast_periods(ym(2031, 1), ym(2030, 12)).is_empty());
    }
}
