//! Rainbow test for linearity.
//!
//! The model is refit on a central sub-sample of the rows. If the relationship
//! is linear, the full-sample fit should be about as good as the sub-sample
//! fit; a large F statistic (small p-value) points to non-linearity.
//!
//! ```text
//! F = ((SSR_full - SSR_mid) / (n - n_mid)) / (SSR_mid / (n_mid - r))
//! F ~ F(n - n_mid, n_mid - r)
//! ```
//!
//! `r` is the numerical rank of the sub-sample design. A dummy column that is
//! constant over the central rows drops the rank without failing the refit.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use tracing::debug;

use crate::domain::{RainbowOptions, RainbowTest};
use crate::error::DiagError;
use crate::math::{numerical_rank, solve_least_squares, sum_squared_residuals};
use crate::models::FittedModel;

/// Run the Rainbow test against a fitted model.
pub fn rainbow_test(model: &FittedModel, opts: &RainbowOptions) -> Result<RainbowTest, DiagError> {
    if !(opts.frac > 0.0 && opts.frac < 1.0) {
        return Err(DiagError::InvalidOption(format!(
            "rainbow frac must be in (0, 1), got {}",
            opts.frac
        )));
    }

    let n = model.y.len();
    let k = model.n_params();
    let order = row_order(model, opts.order_by.as_deref())?;

    let nf = n as f64;
    let low = (0.5 * (1.0 - opts.frac) * nf).ceil() as usize;
    let upp = ((low as f64 + opts.frac * nf).floor() as usize).min(n);
    let n_mid = upp.saturating_sub(low);
    if n_mid < 2 {
        return Err(DiagError::InsufficientObservations { needed: 2, got: n_mid });
    }

    let rows = &order[low..upp];
    let x_mid = DMatrix::from_fn(n_mid, k, |i, j| model.x[(rows[i], j)]);
    let y_mid = DVector::from_fn(n_mid, |i, _| model.y[rows[i]]);

    let rank = numerical_rank(&x_mid.clone().svd(false, false).singular_values);
    if n_mid <= rank {
        return Err(DiagError::InsufficientObservations { needed: rank + 1, got: n_mid });
    }
    let beta = solve_least_squares(&x_mid, &y_mid)
        .ok_or_else(|| DiagError::Numerical("rainbow sub-sample regression failed".to_string()))?;
    let ssr_mid = sum_squared_residuals(&y_mid, &(&x_mid * beta));
    let ssr_full = model.ssr();

    let df_num = n - n_mid;
    let df_denom = n_mid - rank;
    let statistic = if ssr_mid > 0.0 {
        ((ssr_full - ssr_mid) / df_num as f64) / (ssr_mid / df_denom as f64)
    } else {
        f64::INFINITY
    };

    let dist = FisherSnedecor::new(df_num as f64, df_denom as f64)
        .map_err(|e| DiagError::Distribution(e.to_string()))?;
    let p_value = if statistic.is_finite() { dist.sf(statistic) } else { 0.0 };

    debug!(statistic, p_value, n_mid, rank, "rainbow test");

    Ok(RainbowTest {
        statistic,
        p_value,
        df_num,
        df_denom,
        subsample_size: n_mid,
    })
}

/// Row order used to define the "center" of the sample.
fn row_order(model: &FittedModel, order_by: Option<&str>) -> Result<Vec<usize>, DiagError> {
    let mut order: Vec<usize> = (0..model.y.len()).collect();
    let Some(name) = order_by else {
        return Ok(order);
    };

    let j = model
        .spec
        .features
        .iter()
        .position(|f| f == name)
        .ok_or_else(|| DiagError::MissingColumn { name: name.to_string() })?
        + 1;
    order.sort_by(|&a, &b| model.x[(a, j)].total_cmp(&model.x[(b, j)]));
    Ok(order)
}
