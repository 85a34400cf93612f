//! Commodity categories and their parameter profiles.

pub mod classify;
pub mod profile;

pub use classify::*;
pub use profile::*;
