//! Numerical utilities: least squares, differencing, parameter grids.

pub mod grid;
pub mod ols;
pub mod series;

pub use grid::*;
pub use ols::*;
pub use series::*;
