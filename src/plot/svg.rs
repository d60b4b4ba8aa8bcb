//! SVG residual scatter rendered with Plotters.
//!
//! Markers are blue circles at 20% opacity so dense regions read darker,
//! with a faint zero-residual reference line.

use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::{PlotLabels, ResidualPoint};
use crate::error::DiagError;

/// Default SVG canvas size (pixels).
pub const SVG_SIZE: (u32, u32) = (800, 600);

/// Render the residual scatter to an SVG document.
pub fn render_residual_svg(points: &[ResidualPoint], labels: &PlotLabels, size: (u32, u32)) -> Result<String, DiagError> {
    let (x_bounds, y_bounds) = chart_bounds(points);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d(x_bounds[0]..x_bounds[1], y_bounds[0]..y_bounds[1])
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .x_labels(8)
            .y_labels(8)
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(LineSeries::new(
                [(x_bounds[0], 0.0), (x_bounds[1], 0.0)],
                BLACK.mix(0.4).stroke_width(1),
            ))
            .map_err(plot_err)?;

        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.predicted.is_finite() && p.residual.is_finite())
                    .map(|p| Circle::new((p.predicted, p.residual), 4, BLUE.mix(0.2).filled())),
            )
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }

    Ok(svg)
}

/// Render the residual scatter and write it to `path`.
pub fn write_residual_svg(
    path: &Path,
    points: &[ResidualPoint],
    labels: &PlotLabels,
    size: (u32, u32),
) -> Result<(), DiagError> {
    let svg = render_residual_svg(points, labels, size)?;
    fs::write(path, svg)?;
    Ok(())
}

/// Padded x (predicted) and y (residual) bounds, always non-degenerate.
pub fn chart_bounds(points: &[ResidualPoint]) -> ([f64; 2], [f64; 2]) {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for p in points {
        if p.predicted.is_finite() && p.residual.is_finite() {
            x = [x[0].min(p.predicted), x[1].max(p.predicted)];
            y = [y[0].min(p.residual), y[1].max(p.residual)];
        }
    }
    (pad(x), pad(y))
}

fn pad(b: [f64; 2]) -> [f64; 2] {
    if !(b[0].is_finite() && b[1].is_finite()) {
        return [-1.0, 1.0];
    }
    let (lo, hi) = if b[1] > b[0] { (b[0], b[1]) } else { (b[0] - 0.5, b[1] + 0.5) };
    let pad = ((hi - lo) * 0.05).max(1e-12);
    [lo - pad, hi + pad]
}

fn plot_err<E: std::fmt::Display>(e: E) -> DiagError {
    DiagError::Plot(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_has_one_marker_per_point_and_labels() {
        let points: Vec<ResidualPoint> = (0..12)
            .map(|i| ResidualPoint::new(i, i as f64 + 0.5 * ((i % 3) as f64 - 1.0), i as f64))
            .collect();
        let svg = render_residual_svg(&points, &PlotLabels::default(), (400, 300)).unwrap();

        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<circle").count(), points.len());
        assert!(svg.contains("Predicted Sale Price"));
    }

    #[test]
    fn bounds_are_padded_and_never_degenerate() {
        let (x, y) = chart_bounds(&[ResidualPoint::new(0, 3.0, 3.0)]);
        assert!(x[1] > x[0]);
        assert!(y[0] < 0.0 && y[1] > 0.0);

        let (x, _) = chart_bounds(&[]);
        assert_eq!(x, [-1.0, 1.0]);
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resid.svg");
        write_residual_svg(&path, &[ResidualPoint::new(0, 1.0, 2.0)], &PlotLabels::default(), SVG_SIZE).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("<circle"));
    }
}
