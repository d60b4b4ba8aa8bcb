//! Ordinary least squares with an intercept.
//!
//! `FittedModel` keeps the design matrix and response alongside the estimates
//! because the diagnostic tests refit sub-problems of the same design
//! (Rainbow uses a row subset, Breusch–Pagan and VIF reuse the feature
//! columns).

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use tracing::debug;

use crate::domain::{CoefficientRow, Dataset, FitStatistics, ModelSpec, ResidualMoments};
use crate::error::DiagError;
use crate::math::{design_with_intercept, fit_least_squares, residual_moments, sum_squared_residuals};

/// Label of the intercept row in the coefficient table.
pub const INTERCEPT: &str = "Intercept";

/// Two-sided confidence level of the coefficient intervals.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// A fitted OLS model.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub spec: ModelSpec,
    /// Design matrix: intercept column followed by the features in spec order.
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub fitted: DVector<f64>,
    pub coefficients: Vec<CoefficientRow>,
    pub stats: FitStatistics,
    pub moments: ResidualMoments,
}

impl FittedModel {
    /// Fit `spec.target` on an intercept plus `spec.features`.
    ///
    /// `table` must contain every column named by `spec` and no missing cells
    /// (see `Dataset::select`).
    pub fn fit(table: &Dataset, spec: &ModelSpec) -> Result<Self, DiagError> {
        let n = table.n_rows();
        let k = spec.features.len() + 1;
        if n <= k {
            // Residual degrees of freedom must be positive for any inference.
            return Err(DiagError::InsufficientObservations { needed: k + 1, got: n });
        }

        let y = DVector::from_column_slice(table.column(&spec.target)?);
        let feature_cols = spec
            .features
            .iter()
            .map(|f| table.column(f))
            .collect::<Result<Vec<_>, _>>()?;
        let x = design_with_intercept(n, &feature_cols);

        let ls = fit_least_squares(&x, &y)?;
        let ssr = sum_squared_residuals(&y, &ls.fitted);
        let df_model = k - 1;
        let df_resid = n - k;
        let sigma2 = ssr / df_resid as f64;

        let y_mean = y.mean();
        let tss: f64 = y.iter().map(|v| (v - y_mean) * (v - y_mean)).sum();
        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { 0.0 };
        let adj_r_squared = 1.0 - (n as f64 - 1.0) / df_resid as f64 * (1.0 - r_squared);

        let f_statistic = if ssr > 0.0 {
            ((tss - ssr) / df_model as f64) / sigma2
        } else {
            f64::INFINITY
        };
        let f_dist = FisherSnedecor::new(df_model as f64, df_resid as f64)
            .map_err(|e| DiagError::Distribution(e.to_string()))?;
        let f_p_value = if f_statistic.is_finite() { f_dist.sf(f_statistic) } else { 0.0 };

        let nf = n as f64;
        let log_likelihood = -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nf).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k as f64;
        let bic = -2.0 * log_likelihood + k as f64 * nf.ln();

        let t_dist =
            StudentsT::new(0.0, 1.0, df_resid as f64).map_err(|e| DiagError::Distribution(e.to_string()))?;
        let t_crit = t_dist.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0);

        let names = std::iter::once(INTERCEPT).chain(spec.features.iter().map(String::as_str));
        let coefficients = names
            .enumerate()
            .map(|(j, name)| {
                let estimate = ls.beta[j];
                let std_error = (sigma2 * ls.xtx_inv[(j, j)]).max(0.0).sqrt();
                let t_value = estimate / std_error;
                let p_value = if t_value.is_finite() {
                    2.0 * t_dist.sf(t_value.abs())
                } else {
                    0.0
                };
                CoefficientRow {
                    name: name.to_string(),
                    estimate,
                    std_error,
                    t_value,
                    p_value,
                    ci_lower: estimate - t_crit * std_error,
                    ci_upper: estimate + t_crit * std_error,
                }
            })
            .collect();

        let resid: Vec<f64> = y.iter().zip(ls.fitted.iter()).map(|(a, f)| a - f).collect();
        let moments = residual_moments(&resid)?;

        let stats = FitStatistics {
            n_obs: n,
            df_model,
            df_resid,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            log_likelihood,
            aic,
            bic,
            condition_number: ls.condition_number(),
        };
        debug!(
            formula = %spec,
            n,
            r_squared,
            condition_number = stats.condition_number,
            "fitted OLS model"
        );

        Ok(Self {
            spec: spec.clone(),
            x,
            y,
            fitted: ls.fitted,
            coefficients,
            stats,
            moments,
        })
    }

    /// Predicted values for the rows the model was fitted on.
    pub fn predict(&self) -> &DVector<f64> {
        &self.fitted
    }

    /// Prediction errors `predicted - actual`, one per fitted row.
    pub fn prediction_errors(&self) -> DVector<f64> {
        &self.fitted - &self.y
    }

    /// Sum of squared residuals.
    pub fn ssr(&self) -> f64 {
        sum_squared_residuals(&self.y, &self.fitted)
    }

    /// Number of design columns (features + intercept).
    pub fn n_params(&self) -> usize {
        self.x.ncols()
    }

    /// Feature columns of the design, without the intercept.
    pub fn feature_matrix(&self) -> DMatrix<f64> {
        self.x.columns(1, self.x.ncols() - 1).into_owned()
    }

    /// Coefficient estimate by name (`Intercept` or a feature).
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients.iter().find(|c| c.name == name).map(|c| c.estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exact_line() -> (Dataset, ModelSpec) {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.5 + 2.0 * v + if (*v as i64) % 2 == 0 { 0.1 } else { -0.1 }).collect();
        let ds = Dataset::from_columns([("y", y), ("x", x)]).unwrap();
        let spec = ModelSpec::new("y", &["x"]).unwrap();
        (ds, spec)
    }

    #[test]
    fn recovers_line_coefficients() {
        let (ds, spec) = exact_line();
        let model = FittedModel::fit(&ds, &spec).unwrap();

        assert_relative_eq!(model.coefficient("x").unwrap(), 2.0, epsilon = 0.05);
        assert_relative_eq!(model.coefficient(INTERCEPT).unwrap(), 1.5, epsilon = 0.2);
        assert!(model.stats.r_squared > 0.99);
        assert_eq!(model.stats.df_model, 1);
        assert_eq!(model.stats.df_resid, 8);
        // ln(10) > 2, so the BIC penalty exceeds the AIC penalty.
        assert!(model.stats.bic > model.stats.aic);
    }

    #[test]
    fn coefficient_intervals_bracket_estimates() {
        let (ds, spec) = exact_line();
        let model = FittedModel::fit(&ds, &spec).unwrap();
        for c in &model.coefficients {
            assert!(c.ci_lower < c.estimate && c.estimate < c.ci_upper);
            assert!((0.0..=1.0).contains(&c.p_value));
            assert!(c.std_error > 0.0);
        }
        assert!((0.0..=1.0).contains(&model.stats.f_p_value));
    }

    #[test]
    fn prediction_errors_are_predicted_minus_actual() {
        let (ds, spec) = exact_line();
        let model = FittedModel::fit(&ds, &spec).unwrap();
        let errors = model.prediction_errors();
        for i in 0..model.y.len() {
            assert_relative_eq!(errors[i], model.fitted[i] - model.y[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn too_few_rows_for_model() {
        let ds = Dataset::from_columns([("y", vec![1.0, 2.0]), ("x", vec![0.0, 1.0])]).unwrap();
        let spec = ModelSpec::new("y", &["x"]).unwrap();
        let err = FittedModel::fit(&ds, &spec).unwrap_err();
        assert!(matches!(err, DiagError::InsufficientObservations { .. }));
    }
}
