//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - yearly history: `o`
//! - monthly forecast: `-` line
//! - yearly forecast: `*`

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastResult, YearlyPoint};

/// Render yearly history followed by the forecast.
pub fn render_forecast_plot(history: &[YearlyPoint], result: &ForecastResult, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let history_pts: Vec<(f64, f64)> = history.iter().map(|p| (day(p.date), p.price)).collect();
    let monthly_pts: Vec<(f64, f64)> = result.monthly.iter().map(|p| (day(p.date), p.price)).collect();
    let yearly_pts: Vec<(f64, f64)> = result.yearly.iter().map(|p| (day(p.date), p.price)).collect();

    let all = || history_pts.iter().chain(&monthly_pts).chain(&yearly_pts);
    let (t_min, t_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first so markers overlay it.
    draw_curve(&mut grid, &monthly_pts, t_min, t_max, y_min, y_max);

    for (points, ch) in [(&history_pts, 'o'), (&yearly_pts, '*')] {
        for &(t, y) in points.iter() {
            if !y.is_finite() {
                continue;
            }
            let x = map_x(t, t_min, t_max, width);
            let yy = map_y(y, y_min, y_max, height);
            grid[yy][x] = ch;
        }
    }

    let mut out = String::new();
    let first = history
        .first()
        .map(|p| p.date)
        .or_else(|| result.monthly.first().map(|p| p.date));
    let last = result.yearly.last().or(result.monthly.last()).map(|p| p.date);
    out.push_str(&format!("Plot: {}", result.commodity));
    if let (Some(first), Some(last)) = (first, last) {
        out.push_str(&format!(" | {first} .. {last}"));
    }
    out.push_str(&format!(" | price=[{y_min:.2}, {y_max:.2}]\n"));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ForecastPoint, month_end};

    #[test]
    fn plot_golden_snapshot_small() {
        let history = vec![YearlyPoint {
            date: month_end(2023, 12).unwrap(),
            price: 10.0,
        }];
        let result = ForecastResult {
            commodity: "Onion".to_string(),
            category: Category::Vegetables,
            yearly: vec![ForecastPoint::new(month_end(2024, 12).unwrap(), 20.0)],
            monthly: vec![
                ForecastPoint::new(month_end(2024, 1).unwrap(), 10.0),
                ForecastPoint::new(month_end(2024, 12).unwrap(), 20.0),
            ],
        };

        let txt = render_forecast_plot(&history, &result, 10, 5);
        let expected = concat!(
            "Plot: Onion | 2023-12-31 .. 2024-12-31 | price=[9.50, 20.50]\n",
            "        -*\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_forecast_still_renders_frame() {
        let result = ForecastResult {
            commodity: "Gur".to_string(),
            category: Category::Others,
            yearly: Vec::new(),
            monthly: Vec::new(),
        };
        let txt = render_forecast_plot(&[], &result, 12, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.starts_with("Plot: Gur | price="));
    }
}
