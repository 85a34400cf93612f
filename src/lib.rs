//! `cropcast` library crate.
//!
//! The binary (`cropcast`) is a thin wrapper around this library so that:
//!
//! - the forecast pipeline is testable without spawning processes
//! - the data-access side (CSV today) stays swappable
//! - code stays easy to navigate as the project grows

pub mod adjust;
pub mod app;
pub mod category;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
