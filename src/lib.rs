//! `cpi-outlook` library crate.
//!
//! The binary (`cpi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the inflation, forecast and projection stages can be reused on their own

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
