//! Least squares via SVD.
//!
//! Two entry points:
//! - `fit_least_squares` for the main model: requires a full-rank design and
//!   also returns what inference needs (`(XᵀX)⁻¹`, singular values).
//! - `solve_least_squares` for auxiliary regressions (VIF, Breusch–Pagan)
//!   where only fitted values matter, so a minimum-norm solution is fine.
//!
//! SVD is used rather than `QR::solve` because nalgebra's QR solve is meant
//! for square systems and will panic for tall matrices.

use nalgebra::{DMatrix, DVector};

use crate::error::DiagError;

/// Singular values below `RANK_TOL * s_max` count as zero.
pub const RANK_TOL: f64 = 1e-10;

/// A full-rank least squares solution.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    pub fitted: DVector<f64>,
    /// `(XᵀX)⁻¹`, the unscaled coefficient covariance.
    pub xtx_inv: DMatrix<f64>,
    pub singular_values: DVector<f64>,
}

impl LeastSquares {
    /// Ratio of the largest to the smallest singular value of the design.
    pub fn condition_number(&self) -> f64 {
        let max = self.singular_values.max();
        let min = self.singular_values.min();
        if min > 0.0 { max / min } else { f64::INFINITY }
    }
}

/// Build a design matrix with a leading intercept column.
///
/// Every column in `columns` must have length `n`.
pub fn design_with_intercept(n: usize, columns: &[&[f64]]) -> DMatrix<f64> {
    DMatrix::from_fn(n, columns.len() + 1, |i, j| if j == 0 { 1.0 } else { columns[j - 1][i] })
}

/// Numerical rank from singular values.
pub fn numerical_rank(singular_values: &DVector<f64>) -> usize {
    let s_max = singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return 0;
    }
    singular_values.iter().filter(|&&s| s > RANK_TOL * s_max).count()
}

/// Solve a full-rank least squares problem.
///
/// Fails with `InsufficientObservations` when there are fewer rows than
/// columns and with `SingularMatrix` when the design is rank deficient.
pub fn fit_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares, DiagError> {
    let (n, k) = x.shape();
    if n < k {
        return Err(DiagError::InsufficientObservations { needed: k, got: n });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(DiagError::Numerical("design matrix or response contains non-finite values".to_string()));
    }

    let svd = x.clone().svd(true, true);
    let rank = numerical_rank(&svd.singular_values);
    if rank < k {
        return Err(DiagError::SingularMatrix { rank, columns: k });
    }

    let beta = svd
        .solve(y, 0.0)
        .map_err(|e| DiagError::Numerical(format!("SVD solve failed: {e}")))?;
    if !beta.iter().all(|v| v.is_finite()) {
        return Err(DiagError::Numerical("non-finite coefficient estimate".to_string()));
    }

    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| DiagError::Numerical("SVD did not produce V^T".to_string()))?;
    let inv_s2 = DMatrix::from_diagonal(&svd.singular_values.map(|s| 1.0 / (s * s)));
    let xtx_inv = v_t.transpose() * inv_s2 * v_t;

    let fitted = x * &beta;
    Ok(LeastSquares {
        beta,
        fitted,
        xtx_inv,
        singular_values: svd.singular_values,
    })
}

/// Solve a least squares problem using SVD, tolerating rank deficiency.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol * s_max) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Sum of squared differences between `y` and `fitted`.
pub fn sum_squared_residuals(y: &DVector<f64>, fitted: &DVector<f64>) -> f64 {
    y.iter().zip(fitted.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// Centered coefficient of determination.
///
/// A constant response has no variance to explain; R² is 0 in that case.
pub fn r_squared(y: &DVector<f64>, fitted: &DVector<f64>) -> f64 {
    let mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if tss <= 0.0 {
        return 0.0;
    }
    1.0 - sum_squared_residuals(y, fitted) / tss
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);

        let fit = fit_least_squares(&x, &y).unwrap();
        assert!((fit.beta[1] - 3.0).abs() < 1e-10);
        assert!(sum_squared_residuals(&y, &fit.fitted) < 1e-18);
    }

    #[test]
    fn xtx_inverse_matches_direct_inverse() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 3.0, 1.0, 4.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 2.5, 4.0]);
        let fit = fit_least_squares(&x, &y).unwrap();

        let direct = (x.transpose() * &x).try_inverse().unwrap();
        for (a, b) in fit.xtx_inv.iter().zip(direct.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn collinear_design_is_singular() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let x = design_with_intercept(5, &[&a, &b]);
        let y = DVector::from_row_slice(&[1.0, 3.0, 2.0, 5.0, 4.0]);

        let err = fit_least_squares(&x, &y).unwrap_err();
        assert!(matches!(err, DiagError::SingularMatrix { rank: 2, columns: 3 }));

        // The tolerant solver still returns a usable minimum-norm answer.
        assert!(solve_least_squares(&x, &y).is_some());
    }

    #[test]
    fn too_few_rows_is_reported() {
        let x = design_with_intercept(1, &[&[1.0]]);
        let y = DVector::from_row_slice(&[1.0]);
        let err = fit_least_squares(&x, &y).unwrap_err();
        assert!(matches!(err, DiagError::InsufficientObservations { needed: 2, got: 1 }));
    }
}
