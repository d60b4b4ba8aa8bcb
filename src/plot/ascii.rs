//! ASCII residual scatter for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks of residual spread in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - zero-residual reference line: `-`
//! - points, shaded by how many land in the same cell: `.` `:` `o` `@`
//!
//! Shading stands in for marker transparency: isolated points stay faint and
//! dense clusters darken.

use crate::domain::{PlotLabels, ResidualPoint};

/// Marker by number of points in a cell (last entry covers 4+).
const SHADES: [char; 4] = ['.', ':', 'o', '@'];

/// Render predicted values (x) against `predicted - actual` residuals (y).
pub fn render_residual_plot(points: &[ResidualPoint], labels: &PlotLabels, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = range(points.iter().map(|p| p.predicted)) else {
        return "Plot: no finite points to draw.\n".to_string();
    };
    let Some((y_min, y_max)) = range(points.iter().map(|p| p.residual)) else {
        return "Plot: no finite points to draw.\n".to_string();
    };
    let (x_min, x_max) = widen_degenerate(x_min, x_max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let mut counts = vec![vec![0usize; width]; height];

    // Reference line first so points overlay it.
    if y_min <= 0.0 && 0.0 <= y_max {
        let row = map_y(0.0, y_min, y_max, height);
        for cell in grid[row].iter_mut() {
            *cell = '-';
        }
    }

    for p in points {
        if !(p.predicted.is_finite() && p.residual.is_finite()) {
            continue;
        }
        let x = map_x(p.predicted, x_min, x_max, width);
        let y = map_y(p.residual, y_min, y_max, height);
        counts[y][x] += 1;
        grid[y][x] = SHADES[(counts[y][x] - 1).min(SHADES.len() - 1)];
    }

    let mut out = String::new();
    out.push_str(&format!("y: {} [{y_min:.2}, {y_max:.2}]\n", labels.y));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!("x: {} [{x_min:.2}, {x_max:.2}]\n", labels.x));
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn widen_degenerate(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let (min, max) = widen_degenerate(min, max);
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
