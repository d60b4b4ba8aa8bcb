//! Residual shape statistics used in the model summary.
//!
//! - skew / kurtosis use the biased (population) moment estimators
//! - omnibus is D'Agostino–Pearson K² (skew test + kurtosis test)
//! - Jarque–Bera and omnibus are referred to χ²(2)

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::domain::ResidualMoments;
use crate::error::DiagError;

/// Minimum sample size for the D'Agostino skew test.
const OMNIBUS_MIN_N: usize = 8;

fn central_moment(x: &[f64], mean: f64, power: i32) -> f64 {
    x.iter().map(|v| (v - mean).powi(power)).sum::<f64>() / x.len() as f64
}

fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample skewness `m3 / m2^1.5`.
pub fn skew(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let m = mean(x);
    let m2 = central_moment(x, m, 2);
    if m2 <= 0.0 {
        return 0.0;
    }
    central_moment(x, m, 3) / m2.powf(1.5)
}

/// Pearson kurtosis `m4 / m2²` (3 for a normal distribution).
pub fn kurtosis(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let m = mean(x);
    let m2 = central_moment(x, m, 2);
    if m2 <= 0.0 {
        return f64::NAN;
    }
    central_moment(x, m, 4) / (m2 * m2)
}

/// Durbin–Watson statistic of a residual sequence.
pub fn durbin_watson(resid: &[f64]) -> f64 {
    let ss: f64 = resid.iter().map(|r| r * r).sum();
    if ss <= 0.0 {
        return f64::NAN;
    }
    let diff: f64 = resid.windows(2).map(|w| (w[1] - w[0]) * (w[1] - w[0])).sum();
    diff / ss
}

fn chi2_sf(x: f64, df: f64) -> Result<f64, DiagError> {
    if !x.is_finite() {
        return Ok(f64::NAN);
    }
    let dist = ChiSquared::new(df).map_err(|e| DiagError::Distribution(e.to_string()))?;
    Ok(dist.sf(x))
}

/// Jarque–Bera statistic and its χ²(2) p-value.
pub fn jarque_bera(resid: &[f64]) -> Result<(f64, f64), DiagError> {
    let n = resid.len() as f64;
    let s = skew(resid);
    let k = kurtosis(resid);
    let jb = n / 6.0 * (s * s + (k - 3.0) * (k - 3.0) / 4.0);
    Ok((jb, chi2_sf(jb, 2.0)?))
}

/// D'Agostino skew test z-score.
fn skew_test_z(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let b2 = skew(x);
    let y = b2 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let ya = y / alpha;
    delta * (ya + (ya * ya + 1.0).sqrt()).ln()
}

/// Anscombe–Glynn kurtosis test z-score.
fn kurtosis_test_z(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let b2 = kurtosis(x);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let z = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + z * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// D'Agostino–Pearson omnibus K² and its χ²(2) p-value.
///
/// Undefined (`NaN`) for fewer than eight observations.
pub fn omnibus(resid: &[f64]) -> Result<(f64, f64), DiagError> {
    if resid.len() < OMNIBUS_MIN_N {
        return Ok((f64::NAN, f64::NAN));
    }
    let zs = skew_test_z(resid);
    let zk = kurtosis_test_z(resid);
    let k2 = zs * zs + zk * zk;
    Ok((k2, chi2_sf(k2, 2.0)?))
}

/// All residual shape statistics for the summary footer.
pub fn residual_moments(resid: &[f64]) -> Result<ResidualMoments, DiagError> {
    let (omnibus, omnibus_p_value) = omnibus(resid)?;
    let (jarque_bera, jarque_bera_p_value) = jarque_bera(resid)?;
    Ok(ResidualMoments {
        omnibus,
        omnibus_p_value,
        skew: skew(resid),
        kurtosis: kurtosis(resid),
        jarque_bera,
        jarque_bera_p_value,
        durbin_watson: durbin_watson(resid),
    })
}
