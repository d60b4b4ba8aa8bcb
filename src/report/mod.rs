//! Reporting utilities: residual points, report assembly, and formatting.

pub mod format;

pub use format::*;

use crate::domain::{BreuschPaganTest, DiagnosticReport, RainbowTest, ResidualPoint, VifEntry};
use crate::error::DiagError;
use crate::models::FittedModel;

/// Pair each fitted row with its prediction and `predicted - actual` residual.
///
/// `row_index` maps fitted rows back to rows of the input dataset.
pub fn compute_residuals(model: &FittedModel, row_index: &[usize]) -> Result<Vec<ResidualPoint>, DiagError> {
    if row_index.len() != model.y.len() {
        return Err(DiagError::Numerical(format!(
            "{} row indices for {} fitted rows",
            row_index.len(),
            model.y.len()
        )));
    }

    let mut out = Vec::with_capacity(row_index.len());
    for (i, &row) in row_index.iter().enumerate() {
        let predicted = model.fitted[i];
        if !predicted.is_finite() {
            return Err(DiagError::Numerical(format!("non-finite prediction for row {row}")));
        }
        out.push(ResidualPoint::new(row, model.y[i], predicted));
    }
    Ok(out)
}

/// Collect the fit and every diagnostic into one serializable report.
pub fn build_report(
    model: &FittedModel,
    rows_dropped: usize,
    rainbow: RainbowTest,
    vif: Option<Vec<VifEntry>>,
    breusch_pagan: BreuschPaganTest,
) -> DiagnosticReport {
    DiagnosticReport {
        formula: model.spec.formula(),
        target: model.spec.target.clone(),
        features: model.spec.features.clone(),
        rows_dropped,
        fit: model.stats.clone(),
        coefficients: model.coefficients.clone(),
        residual_moments: model.moments.clone(),
        rainbow,
        vif,
        breusch_pagan,
    }
}
