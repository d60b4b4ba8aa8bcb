//! Model specification: a target column regressed on ordered feature columns.
//!
//! The formula text (`y ~ a + b`) is only used for display and for the
//! `--formula` CLI flag; the fit itself works on column names.

use serde::{Deserialize, Serialize};

use crate::error::DiagError;

/// Target plus an ordered, non-empty list of features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub target: String,
    pub features: Vec<String>,
}

impl ModelSpec {
    /// Build a spec, rejecting an empty or duplicated feature list.
    pub fn new<S: AsRef<str>>(target: impl Into<String>, features: &[S]) -> Result<Self, DiagError> {
        let target = target.into();
        let features: Vec<String> = features.iter().map(|f| f.as_ref().to_string()).collect();
        if features.is_empty() {
            return Err(DiagError::EmptyFeatures);
        }
        for (i, f) in features.iter().enumerate() {
            if features[..i].contains(f) {
                return Err(DiagError::InvalidFormula(format!("feature `{f}` is listed twice")));
            }
        }
        Ok(Self { target, features })
    }

    /// Parse `target ~ a + b + c`.
    pub fn parse_formula(text: &str) -> Result<Self, DiagError> {
        let (lhs, rhs) = text
            .split_once('~')
            .ok_or_else(|| DiagError::InvalidFormula(format!("missing `~` in `{text}`")))?;

        let target = lhs.trim();
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(DiagError::InvalidFormula(format!(
                "left-hand side must be a single column name, got `{}`",
                lhs.trim()
            )));
        }

        let rhs = rhs.trim();
        if rhs.is_empty() {
            return Err(DiagError::EmptyFeatures);
        }

        let mut features = Vec::new();
        for term in rhs.split('+') {
            let term = term.trim();
            if term.is_empty() || term.contains(char::is_whitespace) || term.contains('~') {
                return Err(DiagError::InvalidFormula(format!("bad term `{term}` in `{text}`")));
            }
            features.push(term);
        }

        Self::new(target, &features)
    }

    /// Render the formula, preserving feature order.
    pub fn formula(&self) -> String {
        format!("{} ~ {}", self.target, self.features.join(" + "))
    }

    /// Target followed by features: the column order of the model sub-table.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.target.as_str())
            .chain(self.features.iter().map(String::as_str))
            .collect()
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formula())
    }
}
