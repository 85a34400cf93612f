//! Natural cubic spline interpolation.
//!
//! Given knots `(x_i, y_i)` with strictly increasing `x`, the spline is the
//! piecewise cubic with continuous first and second derivatives and zero second
//! derivative at both ends.
//!
//! The second derivatives `M_i` solve the tridiagonal system
//!
//! ```text
//! h_{i-1} M_{i-1} + 2 (h_{i-1} + h_i) M_i + h_i M_{i+1}
//!     = 6 [ (y_{i+1} - y_i) / h_i - (y_i - y_{i-1}) / h_{i-1} ]
//! ```
//!
//! with `M_0 = M_{n-1} = 0`. The system is at most a handful of rows, so we hand
//! it to nalgebra's LU instead of writing a dedicated tridiagonal solver.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    m: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Build a spline through the knots.
    ///
    /// Returns `None` for fewer than two knots, non-finite values, or
    /// non-increasing `x`.
    pub fn new(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        if !xs.iter().chain(ys.iter()).all(|v| v.is_finite()) {
            return None;
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let m = if n == 2 {
            vec![0.0; 2]
        } else {
            solve_second_derivatives(xs, ys)?
        };

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Evaluate at `x`. Outside the knot range the spline is undefined (`None`).
    pub fn eval(&self, x: f64) -> Option<f64> {
        let n = self.xs.len();
        if !(x >= self.xs[0] && x <= self.xs[n - 1]) {
            return None;
        }

        // Segment index i such that xs[i] <= x <= xs[i+1].
        let i = match self.xs.partition_point(|&k| k <= x) {
            0 => 0,
            p => (p - 1).min(n - 2),
        };

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        Some(
            m0 * a.powi(3) / (6.0 * h)
                + m1 * b.powi(3) / (6.0 * h)
                + (y0 / h - m0 * h / 6.0) * a
                + (y1 / h - m1 * h / 6.0) * b,
        )
    }
}

fn solve_second_derivatives(xs: &[f64], ys: &[f64]) -> Option<Vec<f64>> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    // Unknowns are the interior second derivatives M_1..M_{n-2}.
    let k = n - 2;
    let mut a = DMatrix::<f64>::zeros(k, k);
    let mut rhs = DVector::<f64>::zeros(k);

    for row in 0..k {
        let i = row + 1;
        if row > 0 {
            a[(row, row - 1)] = h[i - 1];
        }
        a[(row, row)] = 2.0 * (h[i - 1] + h[i]);
        if row + 1 < k {
            a[(row, row + 1)] = h[i];
        }
        rhs[row] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    let interior = a.lu().solve(&rhs)?;

    let mut m = Vec::with_capacity(n);
    m.push(0.0);
    m.extend(interior.iter().copied());
    m.push(0.0);
    if m.iter().all(|v| v.is_finite()) { Some(m) } else { None }
}
