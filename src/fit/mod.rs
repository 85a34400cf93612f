//! Estimation on the prepared yearly series.
//!
//! Responsibilities:
//!
//! - bounded growth rate for the category (`growth`)
//! - seasonal ARIMA fit and 5-step forecast (`sarima`)

pub mod growth;
pub mod sarima;

pub use growth::*;
pub use sarima::*;
