//! Seasonal ARIMA estimation and forecasting.
//!
//! Given a yearly price series `y` and an order `(p,d,q)(P,D,Q)[s]` we:
//!
//! 1. difference: `w = (1 - B)^d (1 - B^s)^D y`
//! 2. estimate AR/MA coefficients on `w` by Hannan–Rissanen:
//!    - stage 1: a long autoregression on `w` gives residual estimates `ê`
//!    - stage 2: regress `w_t` on lagged `w` and lagged `ê`
//! 3. recompute residuals conditionally (pre-sample shocks = 0) for `σ²`
//! 4. forecast by running the full polynomial `φ(B)(1 - B)^d(1 - B^s)^D`
//!    forward with future shocks set to zero
//!
//! Agricultural histories are short (a handful of yearly points), far shorter
//! than a seasonal period of 12. Terms the sample cannot identify are dropped
//! (largest lag first) until every coefficient has at least one residual degree
//! of freedom; seasonal differencing is skipped when it would leave fewer than
//! `MIN_OBS_AFTER_SEASONAL_DIFF` values. With everything dropped the model
//! degenerates to its integration polynomial (a random walk for `d = 1`).

use nalgebra::{DMatrix, DVector};

use crate::error::ForecastError;
use crate::math::solve_least_squares;
use crate::models::{SarimaOrder, ar_polynomial, difference, fill_design_row, integration_polynomial, poly_mul};

/// Seasonal differencing is only applied if at least this many values remain.
const MIN_OBS_AFTER_SEASONAL_DIFF: usize = 2;

/// A fitted model, ready to forecast.
#[derive(Debug, Clone)]
pub struct SarimaFit {
    /// Requested order.
    pub order: SarimaOrder,
    /// Seasonal differencing actually applied (0 when the series is too short).
    pub seasonal_d: usize,
    pub ar_lags: Vec<usize>,
    pub ar_coefs: Vec<f64>,
    pub ma_lags: Vec<usize>,
    pub ma_coefs: Vec<f64>,
    /// Residual variance of the differenced series.
    pub sigma2: f64,
    history: Vec<f64>,
    /// Residuals aligned with `history` (zero where undefined).
    residuals: Vec<f64>,
}

/// Point forecast with standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    pub mean: Vec<f64>,
    pub std_err: Vec<f64>,
}

impl ModelForecast {
    /// Symmetric intervals `mean ± z · std_err`.
    pub fn intervals(&self, z: f64) -> Vec<(f64, f64)> {
        self.mean
            .iter()
            .zip(&self.std_err)
            .map(|(m, s)| (m - z * s, m + z * s))
            .collect()
    }
}

/// Fit a seasonal ARIMA model to `values`.
pub fn fit_sarima(values: &[f64], order: &SarimaOrder) -> Result<SarimaFit, ForecastError> {
    let model = order.display_name();
    let n = values.len();

    if n < 2 {
        return Err(ForecastError::fit(&model, format!("need at least 2 observations, got {n}")));
    }
    if !values.iter().all(|v| v.is_finite()) {
        return Err(ForecastError::fit(&model, "series contains non-finite values"));
    }
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi - lo <= 1e-12 * hi.abs().max(1.0) {
        return Err(ForecastError::fit(&model, "series is constant"));
    }

    let seasonal_d = if order.period > 0
        && n >= order.d + order.seasonal_d * order.period + MIN_OBS_AFTER_SEASONAL_DIFF
    {
        order.seasonal_d
    } else {
        0
    };
    if seasonal_d < order.seasonal_d {
        tracing::debug!(model = %model, n, "series too short for seasonal differencing; skipped");
    }

    let w = difference(values, order.d, seasonal_d, order.period);
    if w.is_empty() {
        return Err(ForecastError::fit(
            &model,
            format!("{n} observations leave nothing after differencing"),
        ));
    }

    let (ar_lags, ma_lags) = identifiable_lags(w.len(), order.ar_lags(), order.ma_lags());
    tracing::debug!(
        model = %model,
        n,
        ar_lags = ?ar_lags,
        ma_lags = ?ma_lags,
        "identifiable lags"
    );

    let (ar_coefs, ma_coefs) = if ar_lags.is_empty() && ma_lags.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        estimate(&w, &ar_lags, &ma_lags, &model)?
    };

    if order.enforce_stationarity && ar_coefs.iter().map(|c| c.abs()).sum::<f64>() >= 1.0 {
        return Err(ForecastError::fit(&model, "autoregressive part is not stationary"));
    }

    let e = conditional_residuals(&w, &ar_lags, &ar_coefs, &ma_lags, &ma_coefs);
    let start = max_lag(&ar_lags).max(max_lag(&ma_lags));
    let used = &e[start..];
    let sigma2 = if used.is_empty() {
        0.0
    } else {
        used.iter().map(|v| v * v).sum::<f64>() / used.len() as f64
    };
    if !sigma2.is_finite() {
        return Err(ForecastError::fit(&model, "residual variance is not finite"));
    }

    let mut residuals = vec![0.0; n - w.len()];
    residuals.extend(e);

    Ok(SarimaFit {
        order: *order,
        seasonal_d,
        ar_lags,
        ar_coefs,
        ma_lags,
        ma_coefs,
        sigma2,
        history: values.to_vec(),
        residuals,
    })
}

impl SarimaFit {
    /// Label of the effective model, e.g. `SARIMA(1,1,1)(1,1,0)[12]` fitted with lags `[1]`.
    pub fn describe(&self) -> String {
        format!(
            "{} | ar lags {:?} | ma lags {:?} | seasonal diff {}",
            self.order.display_name(),
            self.ar_lags,
            self.ma_lags,
            self.seasonal_d
        )
    }

    /// Forecast `steps` values past the end of the history.
    pub fn forecast(&self, steps: usize) -> ModelForecast {
        let full = poly_mul(
            &ar_polynomial(&self.ar_lags, &self.ar_coefs),
            &integration_polynomial(self.order.d, self.seasonal_d, self.order.period),
        );

        let n = self.history.len();
        let mut y = self.history.clone();
        let mut e = self.residuals.clone();

        for _ in 0..steps {
            let t = y.len();
            let ar: f64 = full
                .iter()
                .enumerate()
                .skip(1)
                .filter_map(|(k, a)| t.checked_sub(k).map(|i| -a * y[i]))
                .sum();
            let ma: f64 = self
                .ma_lags
                .iter()
                .zip(&self.ma_coefs)
                .filter_map(|(&lag, theta)| t.checked_sub(lag).map(|i| theta * e[i]))
                .sum();
            y.push(ar + ma);
            e.push(0.0);
        }

        let psi = self.psi_weights(&full, steps);
        let mut acc = 0.0;
        let std_err = psi
            .iter()
            .map(|p| {
                acc += p * p;
                (self.sigma2 * acc).sqrt()
            })
            .collect();

        ModelForecast {
            mean: y[n..].to_vec(),
            std_err,
        }
    }

    /// ψ-weights of the MA(∞) representation, `ψ_0 = 1`.
    fn psi_weights(&self, full_ar: &[f64], count: usize) -> Vec<f64> {
        let theta = |j: usize| {
            self.ma_lags
                .iter()
                .position(|&lag| lag == j)
                .map(|i| self.ma_coefs[i])
                .unwrap_or(0.0)
        };

        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let ar: f64 = (1..=j.min(full_ar.len() - 1)).map(|k| full_ar[k] * psi[j - k]).sum();
            psi.push(theta(j) - ar);
        }
        psi
    }
}

/// Drop the largest lags until the regression leaves a degree of freedom per coefficient.
///
/// On equal lags the MA term goes first.
fn identifiable_lags(m: usize, mut ar: Vec<usize>, mut ma: Vec<usize>) -> (Vec<usize>, Vec<usize>) {
    while !(ar.is_empty() && ma.is_empty()) && !feasible(m, &ar, &ma) {
        if max_lag(&ma) >= max_lag(&ar) {
            ma.pop();
        } else {
            ar.pop();
        }
    }
    (ar, ma)
}

fn feasible(m: usize, ar: &[usize], ma: &[usize]) -> bool {
    let k = ar.len() + ma.len();
    if !ma.is_empty() {
        let h = long_ar_order(m, ar, ma);
        if m < 2 * h + 1 {
            return false;
        }
    }
    let start = stage_two_start(m, ar, ma);
    m > start && m - start > k
}

/// Order of the stage-one autoregression.
///
/// At least one past the largest lag; on longer samples `ln(m)^2`, capped so the
/// long regression keeps two thirds of the rows.
fn long_ar_order(m: usize, ar: &[usize], ma: &[usize]) -> usize {
    let base = max_lag(ar).max(max_lag(ma)) + 1;
    let rich = (m as f64).ln().powi(2).floor() as usize;
    base.max(rich.min(m.saturating_sub(1) / 3))
}

/// First row of the stage-two regression: all lagged `w` and `ê` must exist.
fn stage_two_start(m: usize, ar: &[usize], ma: &[usize]) -> usize {
    if ma.is_empty() {
        max_lag(ar)
    } else {
        max_lag(ar).max(long_ar_order(m, ar, ma) + max_lag(ma))
    }
}

fn max_lag(lags: &[usize]) -> usize {
    lags.iter().copied().max().unwrap_or(0)
}

fn estimate(
    w: &[f64],
    ar_lags: &[usize],
    ma_lags: &[usize],
    model: &str,
) -> Result<(Vec<f64>, Vec<f64>), ForecastError> {
    let m = w.len();
    let mut e = vec![0.0; m];

    if !ma_lags.is_empty() {
        let h = long_ar_order(m, ar_lags, ma_lags);
        let long_lags: Vec<usize> = (1..=h).collect();
        let long = regress(w, &long_lags, &[], &e, h, model)?;
        for t in h..m {
            let fitted: f64 = long_lags.iter().zip(&long).map(|(&lag, a)| a * w[t - lag]).sum();
            e[t] = w[t] - fitted;
        }
    }

    let start = stage_two_start(m, ar_lags, ma_lags);
    let beta = regress(w, ar_lags, ma_lags, &e, start, model)?;
    let (ar, ma) = beta.split_at(ar_lags.len());
    Ok((ar.to_vec(), ma.to_vec()))
}

fn regress(
    w: &[f64],
    ar_lags: &[usize],
    ma_lags: &[usize],
    e: &[f64],
    start: usize,
    model: &str,
) -> Result<Vec<f64>, ForecastError> {
    let k = ar_lags.len() + ma_lags.len();
    let rows = w.len().saturating_sub(start);
    if rows == 0 || k == 0 {
        return Err(ForecastError::fit(model, "regression has no rows or no regressors"));
    }

    let mut x = DMatrix::<f64>::zeros(rows, k);
    let mut y = DVector::<f64>::zeros(rows);
    let mut row = vec![0.0; k];
    for (r, t) in (start..w.len()).enumerate() {
        fill_design_row(t, w, e, ar_lags, ma_lags, &mut row);
        for (c, v) in row.iter().enumerate() {
            x[(r, c)] = *v;
        }
        y[r] = w[t];
    }

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| ForecastError::fit(model, "least squares solve did not converge"))?;
    Ok(beta.iter().copied().collect())
}

fn conditional_residuals(
    w: &[f64],
    ar_lags: &[usize],
    ar_coefs: &[f64],
    ma_lags: &[usize],
    ma_coefs: &[f64],
) -> Vec<f64> {
    let start = max_lag(ar_lags).max(max_lag(ma_lags));
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let ar: f64 = ar_lags.iter().zip(ar_coefs).map(|(&lag, phi)| phi * w[t - lag]).sum();
        let ma: f64 = ma_lags.iter().zip(ma_coefs).map(|(&lag, theta)| theta * e[t - lag]).sum();
        e[t] = w[t] - ar - ma;
    }
    e
}
