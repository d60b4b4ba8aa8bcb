//! Seeded synthetic linear datasets.
//!
//! `y = intercept + Σ coef_j * x_j + ε`, with `x_j ~ U(0, 10)` and
//! `ε ~ N(0, noise_sd²)`. The same config always yields the same table, which
//! keeps the `demo` command and the tests reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Dataset, SampleConfig};
use crate::error::DiagError;

/// Name of the generated target column.
pub const SAMPLE_TARGET: &str = "y";

/// Feature range for generated regressors.
const FEATURE_RANGE: (f64, f64) = (0.0, 10.0);

/// Feature column names for `k` coefficients: `x1..xk`.
pub fn sample_feature_names(k: usize) -> Vec<String> {
    (1..=k).map(|j| format!("x{j}")).collect()
}

/// Generate a dataset with columns `y, x1, .., xk`.
pub fn generate_linear_sample(config: &SampleConfig) -> Result<Dataset, DiagError> {
    if config.rows == 0 {
        return Err(DiagError::InvalidOption("sample row count must be > 0".to_string()));
    }
    if config.coefficients.is_empty() {
        return Err(DiagError::EmptyFeatures);
    }
    if !config.coefficients.iter().all(|c| c.is_finite()) || !config.intercept.is_finite() {
        return Err(DiagError::InvalidOption("sample coefficients must be finite".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| DiagError::InvalidOption(format!("noise standard deviation: {e}")))?;

    let k = config.coefficients.len();
    let mut features = vec![Vec::with_capacity(config.rows); k];
    let mut y = Vec::with_capacity(config.rows);

    for _ in 0..config.rows {
        let mut value = config.intercept;
        for (column, coef) in features.iter_mut().zip(&config.coefficients) {
            let x = rng.gen_range(FEATURE_RANGE.0..FEATURE_RANGE.1);
            value += coef * x;
            column.push(x);
        }
        y.push(value + noise.sample(&mut rng));
    }

    tracing::debug!(rows = config.rows, features = k, seed = config.seed, "generated synthetic sample");

    let mut dataset = Dataset::default();
    dataset.push_column(SAMPLE_TARGET, y)?;
    for (name, column) in sample_feature_names(k).into_iter().zip(features) {
        dataset.push_column(name, column)?;
    }
    Ok(dataset)
}
