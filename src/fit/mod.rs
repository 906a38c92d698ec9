//! Forecast orchestration.
//!
//! Responsibilities:
//!
//! - compute each category's forecast horizon
//! - fit the chosen strategy per category (parallel), isolating failures
//! - produce forecast records and a failure summary

pub mod horizon;
pub mod runner;

pub use horizon::*;
pub use runner::*;
