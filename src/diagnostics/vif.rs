//! Variance Inflation Factor (VIF) for multicollinearity detection.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{VifEntry, VifOptions};
use crate::error::DiagError;
use crate::math::{r_squared, solve_least_squares, sum_squared_residuals};

/// Compute the Variance Inflation Factor for each feature column.
///
/// For feature j, `VIF_j = 1 / (1 - R²_j)` where `R²_j` comes from regressing
/// column j on every other feature. By default there is no intercept and
/// `R²_j` is uncentered (`1 - SSR / Σ x_j²`), so features with large means
/// report larger values. With `add_constant` the regression includes an
/// intercept and the usual centered R². A feature that is an exact
/// combination of the others gets `f64::INFINITY`.
///
/// Needs at least two features; with one there is nothing to regress on.
///
/// The auxiliary regressions are independent and run on the rayon pool; the
/// result keeps the column order of `features`.
pub fn variance_inflation_factors(
    features: &DMatrix<f64>,
    names: &[String],
    opts: &VifOptions,
) -> Result<Vec<VifEntry>, DiagError> {
    let p = features.ncols();
    if p < 2 {
        return Err(DiagError::InvalidOption(format!(
            "VIF needs at least two features, got {p}"
        )));
    }
    if names.len() != p {
        return Err(DiagError::InvalidOption(format!(
            "{} feature names for {p} feature columns",
            names.len()
        )));
    }

    let values = (0..p)
        .into_par_iter()
        .map(|j| vif_for_column(features, j, opts.add_constant))
        .collect::<Result<Vec<f64>, DiagError>>()?;

    Ok(names
        .iter()
        .zip(values)
        .map(|(name, vif)| VifEntry {
            feature: name.clone(),
            vif,
        })
        .collect())
}

fn vif_for_column(features: &DMatrix<f64>, j: usize, add_constant: bool) -> Result<f64, DiagError> {
    let (n, p) = features.shape();
    let others: Vec<usize> = (0..p).filter(|&k| k != j).collect();

    let x = if add_constant {
        DMatrix::from_fn(n, p, |i, c| if c == 0 { 1.0 } else { features[(i, others[c - 1])] })
    } else {
        DMatrix::from_fn(n, p - 1, |i, c| features[(i, others[c])])
    };
    let y: DVector<f64> = features.column(j).into_owned();

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| DiagError::Numerical(format!("VIF auxiliary regression failed for column {j}")))?;
    let fitted = &x * beta;
    let r2 = if add_constant {
        r_squared(&y, &fitted)
    } else {
        uncentered_r_squared(&y, &fitted)
    };

    let vif = if r2 < 1.0 - 1e-14 {
        1.0 / (1.0 - r2)
    } else {
        f64::INFINITY
    };
    // Rounding can push R² a hair below zero; VIF is bounded below by 1.
    Ok(vif.max(1.0))
}

/// R² against a zero baseline, used when the regression has no intercept.
fn uncentered_r_squared(y: &DVector<f64>, fitted: &DVector<f64>) -> f64 {
    let tss = y.norm_squared();
    if tss <= 0.0 {
        return 0.0;
    }
    1.0 - sum_squared_residuals(y, fitted) / tss
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("x{i}")).collect()
    }

    #[test]
    fn orthogonal_features_have_unit_vif() {
        // Centered, orthogonal columns.
        let a = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let b = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
        let x = DMatrix::from_fn(8, 2, |i, j| if j == 0 { a[i] } else { b[i] });

        let vif = variance_inflation_factors(&x, &names(2), &VifOptions::default()).unwrap();
        assert_eq!(vif.len(), 2);
        assert_eq!(vif[0].feature, "x1");
        for v in &vif {
            assert_relative_eq!(v.vif, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn correlated_features_inflate_and_stay_at_least_one() {
        let x = DMatrix::from_fn(40, 3, |i, j| {
            let t = i as f64;
            match j {
                0 => t,
                1 => t + (t * 1.3).sin() * 2.0,
                _ => (t * 0.7).cos(),
            }
        });
        let vif = variance_inflation_factors(&x, &names(3), &VifOptions::default()).unwrap();
        assert!(vif[0].vif > 10.0, "x1 vif={}", vif[0].vif);
        assert!(vif[1].vif > 10.0, "x2 vif={}", vif[1].vif);
        for v in &vif {
            assert!(v.vif >= 1.0);
        }
    }

    #[test]
    fn exact_combination_is_infinite() {
        let x = DMatrix::from_fn(10, 3, |i, j| {
            let t = i as f64;
            let u = (t * 0.9).sin();
            match j {
                0 => t,
                1 => u,
                _ => 2.0 * t - u,
            }
        });
        let vif = variance_inflation_factors(&x, &names(3), &VifOptions::default()).unwrap();
        assert!(vif.iter().all(|v| v.vif.is_infinite() || v.vif > 1e8));
    }

    #[test]
    fn single_feature_is_rejected() {
        let x = DMatrix::from_element(5, 1, 1.0);
        assert!(variance_inflation_factors(&x, &names(1), &VifOptions::default()).is_err());
    }

    #[test]
    fn constant_choice_matters_for_shifted_features() {
        // Uncorrelated around their means, but both sit far from zero.
        let a = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let b = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
        let x = DMatrix::from_fn(8, 2, |i, j| if j == 0 { 5.0 + a[i] } else { 5.0 + b[i] });

        let centered = variance_inflation_factors(&x, &names(2), &VifOptions { add_constant: true }).unwrap();
        for v in &centered {
            assert_relative_eq!(v.vif, 1.0, epsilon = 1e-9);
        }

        // Without a constant: Σx1² = Σx2² = 208 and Σx1·x2 = 200, so
        // VIF = 208² / (208² - 200²) = 676 / 51.
        let raw = variance_inflation_factors(&x, &names(2), &VifOptions::default()).unwrap();
        for v in &raw {
            assert_relative_eq!(v.vif, 676.0 / 51.0, epsilon = 1e-8);
        }
    }
}
