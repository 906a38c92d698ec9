//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the calendar helpers (`YearMonth`, month name <-> ordinal)
//! - the shared category registry (`Category`) and strategy selector (`ModelKind`)
//! - the value records passed between pipeline stages

pub mod calendar;
pub mod types;

pub use calendar::*;
pub use types::*;
