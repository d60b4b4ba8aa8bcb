//! Error types.
//!
//! - `DiagError` is what the library returns: one variant per failure the
//!   diagnostics pipeline can surface.
//! - `AppError` is what the binary prints: a message plus a process exit code.

use thiserror::Error;

/// Errors raised while selecting data, fitting, or running diagnostic tests.
#[derive(Debug, Error)]
pub enum DiagError {
    #[error("column not found in dataset: `{name}`")]
    MissingColumn { name: String },

    #[error("duplicate column name: `{name}`")]
    DuplicateColumn { name: String },

    #[error("column `{name}` has {got} rows but the dataset has {expected}")]
    RaggedColumn { name: String, expected: usize, got: usize },

    #[error("feature list is empty; a model needs at least one feature")]
    EmptyFeatures,

    #[error("invalid formula: {0}")]
    InvalidFormula(String),

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("design matrix is singular or nearly singular (rank {rank} of {columns} columns)")]
    SingularMatrix { rank: usize, columns: usize },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiagError {
    /// Exit code used by the binary for this failure.
    ///
    /// - 2: input shape / usage
    /// - 3: not enough data
    /// - 4: numerical or internal failure
    pub fn exit_code(&self) -> u8 {
        match self {
            DiagError::MissingColumn { .. }
            | DiagError::DuplicateColumn { .. }
            | DiagError::RaggedColumn { .. }
            | DiagError::EmptyFeatures
            | DiagError::InvalidFormula(_)
            | DiagError::InvalidOption(_)
            | DiagError::Io(_) => 2,
            DiagError::InsufficientObservations { .. } => 3,
            DiagError::SingularMatrix { .. }
            | DiagError::Numerical(_)
            | DiagError::Distribution(_)
            | DiagError::Plot(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<DiagError> for AppError {
    fn from(err: DiagError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
