//! Bounded compound annual growth.

use crate::category::CategoryProfile;
use crate::domain::YearlySeries;

/// Growth rate implied by the yearly series, clipped into the profile's bounds.
///
/// `g = (last / first)^(1/N) - 1` with `N` the number of yearly points. A single
/// point (or a degenerate ratio) yields `min_growth`.
pub fn estimate_growth(yearly: &YearlySeries, profile: &CategoryProfile) -> f64 {
    let n = yearly.len();
    let (Some(first), Some(last)) = (yearly.first(), yearly.last()) else {
        return profile.min_growth;
    };
    if n < 2 {
        return profile.min_growth;
    }

    let cagr = (last.price / first.price).powf(1.0 / n as f64) - 1.0;
    if !cagr.is_finite() {
        tracing::warn!(first = first.price, last = last.price, "non-finite CAGR; using minimum growth");
        return profile.min_growth;
    }

    cagr.max(profile.min_growth).min(profile.max_growth)
}
