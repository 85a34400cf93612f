//! Seasonal ARIMA model definitions.
//!
//! Models are described by small value types and pure polynomial helpers so the
//! fitting code can stay generic over the chosen order.

pub mod sarima;

pub use sarima::*;
