//! Calendar helpers shared by every stage of the pipeline.
//!
//! Month names and ordinals are resolved through `chrono::Month`, so there is a
//! single name <-> ordinal table for the whole crate. `YearMonth` is the period
//! key used by CPI observations, inflation records and projections.

use std::fmt;

use chrono::{Datelike, Month, Months, NaiveDate};

/// Resolve a month name (`"March"`, `"mar"`, `" MARCH "`) to its ordinal 1–12.
pub fn month_ordinal(name: &str) -> Option<u32> {
    name.trim().parse::<Month>().ok().map(|m| m.number_from_month())
}

/// Resolve an ordinal 1–12 to the full English month name.
pub fn month_name(ordinal: u32) -> Option<&'static str> {
    let ordinal = u8::try_from(ordinal).ok()?;
    Month::try_from(ordinal).ok().map(|m| m.name())
}

/// Parse a BLS period code (`M01`..`M12`).
///
/// `M13` is the BLS annual average and is not a month, so it yields `None`.
pub fn parse_bls_period(code: &str) -> Option<u32> {
    let digits = code.trim().strip_prefix('M').or_else(|| code.trim().strip_prefix('m'))?;
    let month = digits.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Parse a period column that may hold a month name, a BLS code, or a number.
pub fn parse_period_field(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Some(m) = month_ordinal(raw) {
        return Some(m);
    }
    if let Some(m) = parse_bls_period(raw) {
        return Some(m);
    }
    raw.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

/// Parse a calendar timestamp as written by the forecast table.
///
/// Accepts `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`; the time part is ignored.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A calendar month, stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Parse a `"<Month name> <YYYY>"` label, e.g. `"March 2020"`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut parts = label.split_whitespace();
        let month = month_ordinal(parts.next()?)?;
        let year = parts.next()?.parse::<i32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(year, month)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// `"<Month name> <YYYY>"`.
    pub fn label(self) -> String {
        self.0.format("%B %Y").to_string()
    }

    pub fn add_months(self, months: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(months)).map(Self)
    }

    pub fn succ(self) -> Option<Self> {
        self.add_months(1)
    }

    /// Signed number of whole months from `self` to `later`.
    ///
    /// `(later.year - self.year) * 12 + (later.month - self.month)`.
    pub fn months_until(self, later: Self) -> i32 {
        (later.year() - self.year()) * 12 + later.month() as i32 - self.month() as i32
    }

    /// True when `self` is the month immediately after `prev`, including the
    /// December -> January rollover.
    pub fn follows(self, prev: Self) -> bool {
        let same_year_next = self.year() == prev.year() && self.month() == prev.month() + 1;
        let rollover = self.year() == prev.year() + 1 && prev.month() == 12 && self.month() == 1;
        same_year_next || rollover
    }

    /// The `count` months after `self`, in order.
    pub fn following(self, count: usize) -> Vec<Self> {
        let mut out = Vec::with_capacity(count);
        let mut cur = self;
        for _ in 0..count {
            match cur.succ() {
                Some(next) => {
                    out.push(next);
                    cur = next;
                }
                None => break,
            }
        }
        out
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
