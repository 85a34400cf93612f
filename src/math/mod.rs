//! Mathematical utilities: least squares, cubic splines and gap filling.

pub mod fill;
pub mod ols;
pub mod spline;

pub use fill::*;
pub use ols::*;
pub use spline::*;
