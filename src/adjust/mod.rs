//! Post-model heuristics.
//!
//! - seasonal factors and growth windows on the yearly forecast (`seasonal`)
//! - monthly interpolation with volatility and a price floor (`monthly`)

pub mod monthly;
pub mod seasonal;

pub use monthly::*;
pub use seasonal::*;
