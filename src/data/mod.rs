//! External data sources.
//!
//! - BLS CPI series (`bls`)
//! - seeded synthetic CPI tables (`sample`)
//! - supermarket sales baseline (`sales`)

pub mod bls;
pub mod sales;
pub mod sample;

pub use bls::*;
pub use sales::*;
pub use sample::*;
