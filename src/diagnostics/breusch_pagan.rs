//! Breusch–Pagan test for heteroscedasticity.
//!
//! Squared residuals are regressed on an intercept plus the feature columns.
//! Under constant variance the auxiliary R² should be small:
//!
//! ```text
//! LM = n * R²                          LM ~ χ²(p)
//! F  = (R² / p) / ((1 - R²) / (n-p-1)) F  ~ F(p, n - p - 1)
//! ```
//!
//! `LM = n·R²` is the studentized (Koenker) form, which does not assume
//! normally distributed errors.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};
use tracing::debug;

use crate::domain::BreuschPaganTest;
use crate::error::DiagError;
use crate::math::{r_squared, solve_least_squares};

/// Run the Breusch–Pagan test.
///
/// `residuals` may use either sign convention; only their squares enter.
pub fn breusch_pagan(residuals: &DVector<f64>, features: &DMatrix<f64>) -> Result<BreuschPaganTest, DiagError> {
    let (n, p) = features.shape();
    if residuals.len() != n {
        return Err(DiagError::InvalidOption(format!(
            "{} residuals for {n} feature rows",
            residuals.len()
        )));
    }
    if p == 0 {
        return Err(DiagError::EmptyFeatures);
    }
    if n <= p + 1 {
        return Err(DiagError::InsufficientObservations { needed: p + 2, got: n });
    }

    let e2 = residuals.map(|e| e * e);
    let x = DMatrix::from_fn(n, p + 1, |i, j| if j == 0 { 1.0 } else { features[(i, j - 1)] });
    let beta = solve_least_squares(&x, &e2)
        .ok_or_else(|| DiagError::Numerical("Breusch-Pagan auxiliary regression failed".to_string()))?;
    let r2 = r_squared(&e2, &(&x * beta)).clamp(0.0, 1.0);

    let lm = n as f64 * r2;
    let chi2 = ChiSquared::new(p as f64).map_err(|e| DiagError::Distribution(e.to_string()))?;
    let lm_p_value = chi2.sf(lm);

    let df_resid = n - p - 1;
    let (f_statistic, f_p_value) = if r2 < 1.0 {
        let f = (r2 / p as f64) / ((1.0 - r2) / df_resid as f64);
        let dist = FisherSnedecor::new(p as f64, df_resid as f64)
            .map_err(|e| DiagError::Distribution(e.to_string()))?;
        (f, dist.sf(f))
    } else {
        (f64::INFINITY, 0.0)
    };

    debug!(lm, lm_p_value, f_statistic, f_p_value, "breusch-pagan test");

    Ok(BreuschPaganTest {
        lm,
        lm_p_value,
        f_statistic,
        f_p_value,
        df: p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, 1, |i, _| 1.0 + i as f64 / 10.0)
    }

    #[test]
    fn fanning_residuals_are_detected() {
        let x = column(200);
        let resid = DVector::from_fn(200, |i, _| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            sign * x[(i, 0)]
        });
        let test = breusch_pagan(&resid, &x).unwrap();
        assert_eq!(test.df, 1);
        assert!(test.lm_p_value < 1e-6, "lm p={}", test.lm_p_value);
        assert!(test.f_p_value < 1e-6, "f p={}", test.f_p_value);
    }

    #[test]
    fn constant_spread_is_not_rejected() {
        let x = column(200);
        let resid = DVector::from_fn(200, |i, _| ((i as f64) * 2.3).sin());
        let test = breusch_pagan(&resid, &x).unwrap();
        assert!(test.lm_p_value > 0.01, "lm p={}", test.lm_p_value);
        assert!((0.0..=1.0).contains(&test.f_p_value));
    }

    #[test]
    fn sign_of_residuals_does_not_matter() {
        let x = column(50);
        let resid = DVector::from_fn(50, |i, _| ((i as f64) * 0.9).cos() * (1.0 + i as f64 / 50.0));
        let a = breusch_pagan(&resid, &x).unwrap();
        let b = breusch_pagan(&(-&resid), &x).unwrap();
        assert_relative_eq!(a.lm, b.lm, epsilon = 1e-12);
        assert_relative_eq!(a.f_p_value, b.f_p_value, epsilon = 1e-12);
    }
}
