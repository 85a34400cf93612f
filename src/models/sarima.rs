//! Seasonal ARIMA model orders and the lag-polynomial algebra behind them.
//!
//! Notation: `B` is the backshift operator (`B y_t = y_{t-1}`). A polynomial is
//! stored as its coefficient vector `[c_0, c_1, ...]` meaning `Σ c_k B^k`.
//!
//! The fitter works on the differenced series `w_t = (1 - B)^d (1 - B^s)^D y_t`
//! and the forecaster goes back to levels through the full polynomial
//! `φ(B) (1 - B)^d (1 - B^s)^D`.
//!
//! Seasonal and regular lags are combined additively: `φ(B)` has free
//! coefficients on `{1..p} ∪ {s..Ps}` rather than the multiplicative
//! `φ_p(B) Φ_P(B^s)` with its cross lags (`s+1`, `s+2`, ...). The same holds
//! for the MA side. The label keeps the usual `SARIMA(p,d,q)(P,D,Q)[s]` form.

use crate::domain::Category;

/// `(p, d, q) × (P, D, Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
    /// Reject fits whose AR polynomial is not clearly stationary.
    pub enforce_stationarity: bool,
}

impl SarimaOrder {
    /// Model order used for a category.
    ///
    /// Vegetables and pulses swing harder and get the higher-order model.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Vegetables | Category::Pulses => SarimaOrder {
                p: 2,
                d: 1,
                q: 2,
                seasonal_p: 2,
                seasonal_d: 1,
                seasonal_q: 1,
                period: 12,
                enforce_stationarity: false,
            },
            Category::Oils | Category::Cereals | Category::Others => SarimaOrder {
                p: 1,
                d: 1,
                q: 1,
                seasonal_p: 1,
                seasonal_d: 1,
                seasonal_q: 0,
                period: 12,
                enforce_stationarity: false,
            },
        }
    }

    /// Human-readable label, e.g. `SARIMA(1,1,1)(1,1,0)[12]`.
    pub fn display_name(&self) -> String {
        format!(
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }

    /// Autoregressive lags: `{1..p} ∪ {s, 2s, .., Ps}`, ascending.
    pub fn ar_lags(&self) -> Vec<usize> {
        merge_lags(self.p, self.seasonal_p, self.period)
    }

    /// Moving-average lags: `{1..q} ∪ {s, 2s, .., Qs}`, ascending.
    pub fn ma_lags(&self) -> Vec<usize> {
        merge_lags(self.q, self.seasonal_q, self.period)
    }
}

fn merge_lags(regular: usize, seasonal: usize, period: usize) -> Vec<usize> {
    let mut lags: Vec<usize> = (1..=regular).collect();
    if period > 0 {
        lags.extend((1..=seasonal).map(|k| k * period));
    }
    lags.sort_unstable();
    lags.dedup();
    lags
}

/// Product of two lag polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `(1 - B)^d (1 - B^s)^D`.
pub fn integration_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// `1 - Σ φ_l B^l` for the given lags.
pub fn ar_polynomial(lags: &[usize], coefs: &[f64]) -> Vec<f64> {
    let degree = lags.iter().copied().max().unwrap_or(0);
    let mut poly = vec![0.0; degree + 1];
    poly[0] = 1.0;
    for (&lag, &phi) in lags.iter().zip(coefs) {
        poly[lag] -= phi;
    }
    poly
}

/// Apply `(1 - B)^d (1 - B^s)^D` to a series. The result is shorter by `d + D·s`.
pub fn difference(values: &[f64], d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = lagged_difference(&out, 1);
    }
    if period > 0 {
        for _ in 0..seasonal_d {
            out = lagged_difference(&out, period);
        }
    }
    out
}

fn lagged_difference(values: &[f64], lag: usize) -> Vec<f64> {
    if values.len() <= lag {
        return Vec::new();
    }
    values.windows(lag + 1).map(|w| w[lag] - w[0]).collect()
}

/// Fill a regression row for time `t` of the differenced series.
///
/// Columns: `w_{t-l}` for each AR lag, then `e_{t-l}` for each MA lag.
///
/// # Panics
/// Panics if `out.len() != ar_lags.len() + ma_lags.len()` or if `t` is smaller
/// than the largest lag. Callers size and start rows accordingly.
pub fn fill_design_row(t: usize, w: &[f64], e: &[f64], ar_lags: &[usize], ma_lags: &[usize], out: &mut [f64]) {
    for (slot, &lag) in out.iter_mut().zip(ar_lags) {
        *slot = w[t - lag];
    }
    for (slot, &lag) in out[ar_lags.len()..].iter_mut().zip(ma_lags) {
        *slot = e[t - lag];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_orders() {
        let veg = SarimaOrder::for_category(Category::Vegetables);
        assert_eq!(veg.display_name(), "SARIMA(2,1,2)(2,1,1)[12]");
        assert_eq!(veg.ar_lags(), vec![1, 2, 12, 24]);
        assert_eq!(veg.ma_lags(), vec![1, 2, 12]);

        let cereals = SarimaOrder::for_category(Category::Cereals);
        assert_eq!(cereals.display_name(), "SARIMA(1,1,1)(1,1,0)[12]");
        assert_eq!(cereals.ar_lags(), vec![1, 12]);
        assert_eq!(cereals.ma_lags(), vec![1]);
        assert!(!cereals.enforce_stationarity);
    }

    #[test]
    fn seasonal_lags_are_additive() {
        let veg = SarimaOrder::for_category(Category::Vegetables);
        assert_eq!(veg.ar_lags(), vec![1, 2, 12, 24]);
        assert_eq!(veg.ma_lags(), vec![1, 2, 12]);

        let wheat = SarimaOrder::for_category(Category::Cereals);
        assert_eq!(wheat.ar_lags(), vec![1, 12]);
        assert_eq!(wheat.ma_lags(), vec![1]);
    }

    #[test]
    fn integration_polynomial_expands_products() {
        assert_eq!(integration_polynomial(1, 0, 12), vec![1.0, -1.0]);
        assert_eq!(integration_polynomial(2, 0, 12), vec![1.0, -2.0, 1.0]);

        let p = integration_polynomial(1, 1, 4);
        // (1 - B)(1 - B^4) = 1 - B - B^4 + B^5
        assert_eq!(p, vec![1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn difference_matches_polynomial() {
        let y: Vec<f64> = (0..12).map(|i| (i as f64).powi(2) + 0.5 * i as f64).collect();
        let w = difference(&y, 1, 1, 4);
        let poly = integration_polynomial(1, 1, 4);
        assert_eq!(w.len(), y.len() - 5);
        for (j, wj) in w.iter().enumerate() {
            let t = j + 5;
            let direct: f64 = poly.iter().enumerate().map(|(k, c)| c * y[t - k]).sum();
            assert!((wj - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn differencing_short_series_yields_empty() {
        assert!(difference(&[1.0], 1, 0, 12).is_empty());
        assert!(difference(&[1.0, 2.0, 3.0], 1, 1, 12).is_empty());
    }

    #[test]
    fn ar_polynomial_places_coefficients_at_lags() {
        let poly = ar_polynomial(&[1, 3], &[0.5, -0.2]);
        assert_eq!(poly, vec![1.0, -0.5, 0.0, 0.2]);
    }

    #[test]
    fn design_row_layout() {
        let w = [1.0, 2.0, 3.0, 4.0];
        let e = [0.1, 0.2, 0.3, 0.4];
        let mut row = [0.0; 3];
        fill_design_row(3, &w, &e, &[1, 2], &[1], &mut row);
        assert_eq!(row, [3.0, 2.0, 0.3]);
    }
}
