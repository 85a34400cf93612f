//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input rows and cleaned observations (`RawPriceRow`, `CommodityHistory`, `PricePoint`)
//! - the yearly resampled series (`YearlySeries`)
//! - commodity categories (`Category`)
//! - forecast outputs (`ForecastPoint`, `ForecastResult`) and their JSON file form (`ForecastFile`)

pub mod types;

pub use types::*;
