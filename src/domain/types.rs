//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the fit, diagnostics and reporting stages
//! - exported to JSON/CSV
//! - rendered by both the plain-text report and the TUI

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default x-axis label of the residual plot.
pub const DEFAULT_X_LABEL: &str = "Predicted Sale Price";

/// Default y-axis label of the residual plot.
pub const DEFAULT_Y_LABEL: &str = "Residuals (Predicted - Actual Sale Price)";

/// Axis labels for the residual scatter plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotLabels {
    pub x: String,
    pub y: String,
}

impl Default for PlotLabels {
    fn default() -> Self {
        Self {
            x: DEFAULT_X_LABEL.to_string(),
            y: DEFAULT_Y_LABEL.to_string(),
        }
    }
}

/// Rainbow test settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RainbowOptions {
    /// Fraction of rows in the central sub-sample, in `(0, 1)`.
    pub frac: f64,
    /// Sort rows by this feature before taking the sub-sample.
    ///
    /// `None` keeps the dataset's row order.
    pub order_by: Option<String>,
}

impl Default for RainbowOptions {
    fn default() -> Self {
        Self {
            frac: 0.5,
            order_by: None,
        }
    }
}

/// VIF settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VifOptions {
    /// Regress each feature on an intercept plus the others (centered R²).
    ///
    /// Off by default: the auxiliary regressions use the raw feature columns
    /// and the uncentered R², which is what statsmodels reports for a design
    /// without a constant column.
    pub add_constant: bool,
}

/// How (and whether) the residual plot is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Print the ASCII scatter after the diagnostics.
    pub ascii: bool,
    /// ASCII plot width (columns).
    pub width: usize,
    /// ASCII plot height (rows).
    pub height: usize,
    /// Also write an SVG scatter to this path.
    pub svg_path: Option<PathBuf>,
    pub labels: PlotLabels,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            ascii: true,
            width: 80,
            height: 24,
            svg_path: None,
            labels: PlotLabels::default(),
        }
    }
}

/// Options for a single diagnostics run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagOptions {
    pub rainbow: RainbowOptions,
    pub vif: VifOptions,
    pub plot: PlotOptions,
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A CSV file with a header row.
    Csv(PathBuf),
    /// A seeded synthetic linear dataset.
    Synthetic(SampleConfig),
}

/// Parameters for the synthetic `y = intercept + Σ coef_j * x_j + noise` dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub rows: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            coefficients: vec![2.0, 3.0],
            intercept: 0.0,
            noise_sd: 1.0,
            seed: 42,
        }
    }
}

/// A full run's configuration as understood by the app layer.
///
/// This is derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct DiagConfig {
    pub source: DataSource,
    /// `None` means "`target` on every other column".
    pub model: Option<crate::domain::ModelSpec>,
    /// Target used when `model` is `None` (defaults to `y`).
    pub target: Option<String>,
    pub options: DiagOptions,
    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Model-level goodness of fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Ratio of the largest to the smallest singular value of the design.
    pub condition_number: f64,
}

/// Shape and serial-correlation statistics of the fit residuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualMoments {
    pub omnibus: f64,
    pub omnibus_p_value: f64,
    pub skew: f64,
    /// Pearson kurtosis (a normal sample is ~3).
    pub kurtosis: f64,
    pub jarque_bera: f64,
    pub jarque_bera_p_value: f64,
    pub durbin_watson: f64,
}

/// Rainbow test for linearity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainbowTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df_num: usize,
    pub df_denom: usize,
    /// Rows in the central sub-sample.
    pub subsample_size: usize,
}

/// Variance inflation factor of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VifEntry {
    pub feature: String,
    pub vif: f64,
}

/// Breusch–Pagan test for heteroscedasticity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreuschPaganTest {
    pub lm: f64,
    pub lm_p_value: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub df: usize,
}

/// Everything a diagnostics run computes, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub formula: String,
    pub target: String,
    pub features: Vec<String>,
    /// Rows dropped from the selection because of missing cells.
    pub rows_dropped: usize,
    pub fit: FitStatistics,
    pub coefficients: Vec<CoefficientRow>,
    pub residual_moments: ResidualMoments,
    pub rainbow: RainbowTest,
    /// Present only when the model has more than one feature.
    pub vif: Option<Vec<VifEntry>>,
    pub breusch_pagan: BreuschPaganTest,
}

/// A per-row fitted result (used for plots and exports).
///
/// `residual` is always `predicted - actual`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualPoint {
    /// Row index in the input dataset.
    pub row: usize,
    pub actual: f64,
    pub predicted: f64,
    pub residual: f64,
}

impl ResidualPoint {
    pub fn new(row: usize, actual: f64, predicted: f64) -> Self {
        Self {
            row,
            actual,
            predicted,
            residual: predicted - actual,
        }
    }
}
