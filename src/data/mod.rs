//! Input data handling.
//!
//! - cleaning and yearly resampling of raw history (`prepare`)
//! - seeded synthetic history for demos and tests (`sample`)

pub mod prepare;
pub mod sample;

pub use prepare::*;
pub use sample::*;
