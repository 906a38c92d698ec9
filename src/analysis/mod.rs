//! Analysis stages that run on typed records:
//!
//! - inflation from CPI observations
//! - historical + forecast merge
//! - accuracy metrics and backtests
//! - price and COGS projection

pub mod evaluate;
pub mod inflation;
pub mod merge;
pub mod price;

pub use evaluate::*;
pub use inflation::*;
pub use merge::*;
pub use price::*;
