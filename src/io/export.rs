//! Export run results.
//!
//! - per-row residuals as CSV (easy to consume in spreadsheets)
//! - the full diagnostic report as pretty JSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{DiagnosticReport, ResidualPoint};
use crate::error::AppError;

/// Write per-row residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[ResidualPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "row,actual,predicted,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(out, "{},{:.10},{:.10},{:.10}", r.row, r.actual, r.predicted, r.residual)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the diagnostic report as JSON.
pub fn write_report_json(path: &Path, report: &DiagnosticReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{breusch_pagan, rainbow_test};
    use crate::domain::{Dataset, ModelSpec, RainbowOptions};
    use crate::models::FittedModel;
    use crate::report::{build_report, compute_residuals};

    fn fitted() -> FittedModel {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * v + (v * 1.7).sin()).collect();
        let ds = Dataset::from_columns([("y", y), ("x", x)]).unwrap();
        FittedModel::fit(&ds, &ModelSpec::new("y", &["x"]).unwrap()).unwrap()
    }

    #[test]
    fn residual_csv_has_header_and_one_line_per_row() {
        let model = fitted();
        let rows: Vec<usize> = (0..20).collect();
        let points = compute_residuals(&model, &rows).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resid.csv");
        write_residuals_csv(&path, &points).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "row,actual,predicted,residual");
        assert_eq!(lines.len(), 21);
        assert!(lines[1].starts_with("0,"));
    }

    #[test]
    fn report_json_carries_tests_and_skips_vif_for_one_feature() {
        let model = fitted();
        let rainbow = rainbow_test(&model, &RainbowOptions::default()).unwrap();
        let bp = breusch_pagan(&model.prediction_errors(), &model.feature_matrix()).unwrap();
        let report = build_report(&model, 0, rainbow, None, bp);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["formula"], "y ~ x");
        assert!(value["vif"].is_null());
        let p = value["rainbow"]["p_value"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(value["coefficients"].as_array().unwrap().len(), 2);
    }
}
