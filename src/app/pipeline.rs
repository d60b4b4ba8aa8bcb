//! Shared diagnostics pipeline used by the CLI, the TUI and library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! select -> fit -> summary -> rainbow -> VIF (if > 1 feature) -> Breusch–Pagan -> residuals
//!
//! Each block is written to the output as soon as it is computed, so a failure
//! in a later check leaves the earlier output in place.

use std::io::{self, Write};

use chrono::Local;
use tracing::{debug, info};

use crate::diagnostics::{breusch_pagan, rainbow_test, variance_inflation_factors};
use crate::domain::{Dataset, DiagOptions, DiagnosticReport, ModelSpec, ResidualPoint};
use crate::error::DiagError;
use crate::models::FittedModel;
use crate::plot::{render_residual_plot, write_residual_svg, SVG_SIZE};
use crate::report::{
    build_report, compute_residuals, format_checks_heading, format_homoscedasticity, format_independence,
    format_linearity, format_summary,
};

/// All computed outputs of a single diagnostics run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub spec: ModelSpec,
    /// Rows dropped because a model column had a missing cell.
    pub rows_dropped: usize,
    pub model: FittedModel,
    pub report: DiagnosticReport,
    /// Per-row residuals, indexed by the dataset's original rows.
    pub residuals: Vec<ResidualPoint>,
}

/// Fit `target ~ features` and print every diagnostic plus the residual plot
/// to stdout, with default options.
pub fn run<S: AsRef<str>>(dataset: &Dataset, target: &str, features: &[S]) -> Result<(), DiagError> {
    let spec = ModelSpec::new(target, features)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_writer(dataset, &spec, &DiagOptions::default(), &mut out)?;
    Ok(())
}

/// Like [`run`], but with explicit options and output sink.
///
/// Writes the report, then the ASCII plot (if enabled), then the SVG file (if
/// a path is configured).
pub fn run_with_writer<W: Write>(
    dataset: &Dataset,
    spec: &ModelSpec,
    opts: &DiagOptions,
    out: &mut W,
) -> Result<RunOutput, DiagError> {
    let output = execute(dataset, spec, opts, out)?;

    let plot = &opts.plot;
    if plot.ascii {
        writeln!(out)?;
        write!(
            out,
            "{}",
            render_residual_plot(&output.residuals, &plot.labels, plot.width, plot.height)
        )?;
    }
    if let Some(path) = &plot.svg_path {
        write_residual_svg(path, &output.residuals, &plot.labels, SVG_SIZE)?;
        info!(path = %path.display(), "wrote residual plot");
    }
    out.flush()?;

    Ok(output)
}

/// Compute every diagnostic without printing anything.
pub fn analyze(dataset: &Dataset, spec: &ModelSpec, opts: &DiagOptions) -> Result<RunOutput, DiagError> {
    execute(dataset, spec, opts, &mut io::sink())
}

/// Run the fit and the assumption checks, writing each text block to `out`
/// as it completes. Does not draw the plot.
pub fn execute<W: Write>(
    dataset: &Dataset,
    spec: &ModelSpec,
    opts: &DiagOptions,
    out: &mut W,
) -> Result<RunOutput, DiagError> {
    // 1) Sub-table of target + features, incomplete rows dropped.
    let selection = dataset.select(&spec.columns())?;
    if selection.dropped > 0 {
        debug!(
            dropped = selection.dropped,
            kept = selection.row_index.len(),
            "dropped rows with missing cells"
        );
    }

    // 2) Fit and print the summary.
    let model = FittedModel::fit(&selection.table, spec)?;
    info!(formula = %spec, n_obs = model.stats.n_obs, rows_dropped = selection.dropped, "running assumption checks");
    write!(out, "{}", format_summary(&model, selection.dropped, Local::now()))?;
    write!(out, "{}", format_checks_heading())?;

    // 3) Linearity.
    let rainbow = rainbow_test(&model, &opts.rainbow)?;
    write!(out, "{}", format_linearity(&rainbow))?;

    // 4) Independence, only meaningful with more than one feature.
    let vif = if spec.features.len() > 1 {
        let entries = variance_inflation_factors(&model.feature_matrix(), &spec.features, &opts.vif)?;
        write!(out, "{}", format_independence(&entries))?;
        Some(entries)
    } else {
        debug!("single feature; skipping VIF");
        None
    };

    // 5) Homoscedasticity on predicted - actual.
    let bp = breusch_pagan(&model.prediction_errors(), &model.feature_matrix())?;
    write!(out, "{}", format_homoscedasticity(&bp))?;

    let residuals = compute_residuals(&model, &selection.row_index)?;
    let report = build_report(&model, selection.dropped, rainbow, vif, bp);

    Ok(RunOutput {
        spec: spec.clone(),
        rows_dropped: selection.dropped,
        model,
        report,
        residuals,
    })
}

/// Model used when only a dataset is given: `target` on every other column.
pub fn default_spec(dataset: &Dataset, target: &str) -> Result<ModelSpec, DiagError> {
    if !dataset.has_column(target) {
        return Err(DiagError::MissingColumn { name: target.to_string() });
    }
    let features: Vec<&str> = dataset.names().filter(|n| *n != target).collect();
    ModelSpec::new(target, &features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_linear_sample;
    use crate::domain::SampleConfig;

    fn sample() -> Dataset {
        generate_linear_sample(&SampleConfig::default()).unwrap()
    }

    #[test]
    fn prints_blocks_in_order() {
        let spec = ModelSpec::new("y", &["x1", "x2"]).unwrap();
        let mut buf = Vec::new();
        run_with_writer(&sample(), &spec, &DiagOptions::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let order = [
            "OLS Regression Results",
            "Check Assumptions of Linear Regression",
            "Rainbow Statistic:",
            "Independence",
            "Lagrange Multiplier p-value:",
            "y: Residuals (Predicted - Actual Sale Price)",
            "x: Predicted Sale Price",
        ];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn single_feature_has_no_vif() {
        let spec = ModelSpec::new("y", &["x1"]).unwrap();
        let mut buf = Vec::new();
        let run = execute(&sample(), &spec, &DiagOptions::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(run.report.vif.is_none());
        assert!(!text.contains("Independence"));
        assert!(text.contains("Homoscedasticity"));
    }

    #[test]
    fn summary_stays_written_when_a_later_check_fails() {
        let mut opts = DiagOptions::default();
        opts.rainbow.frac = 1.5;
        let spec = ModelSpec::new("y", &["x1", "x2"]).unwrap();
        let mut buf = Vec::new();

        let err = execute(&sample(), &spec, &opts, &mut buf).unwrap_err();
        assert!(matches!(err, DiagError::InvalidOption(_)));
        assert!(String::from_utf8(buf).unwrap().contains("OLS Regression Results"));
    }

    #[test]
    fn default_spec_uses_every_other_column() {
        let spec = default_spec(&sample(), "y").unwrap();
        assert_eq!(spec.formula(), "y ~ x1 + x2");
        assert!(matches!(default_spec(&sample(), "price"), Err(DiagError::MissingColumn { .. })));
    }

    #[test]
    fn svg_is_written_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = DiagOptions::default();
        opts.plot.ascii = false;
        opts.plot.svg_path = Some(dir.path().join("plot.svg"));

        let spec = ModelSpec::new("y", &["x1", "x2"]).unwrap();
        let mut buf = Vec::new();
        let run = run_with_writer(&sample(), &spec, &opts, &mut buf).unwrap();

        let svg = std::fs::read_to_string(dir.path().join("plot.svg")).unwrap();
        assert_eq!(svg.matches("<circle").count(), run.residuals.len());
        assert!(!String::from_utf8(buf).unwrap().contains("x: Predicted"));
    }
}
