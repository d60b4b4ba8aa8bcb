//! In-memory table of named numeric columns.
//!
//! Rows are aligned by position. A missing cell is stored as `NaN`, which keeps
//! every column a plain `Vec<f64>` and lets selection drop incomplete rows in
//! one pass.

use std::collections::HashSet;

use crate::error::DiagError;

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// A table of equally long, uniquely named `f64` columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

/// Result of selecting model columns out of a dataset.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Sub-table with only the requested columns, in request order.
    pub table: Dataset,
    /// Original row index of each retained row.
    pub row_index: Vec<usize>,
    /// Number of rows dropped because a selected cell was missing.
    pub dropped: usize,
}

impl Dataset {
    /// Build a dataset from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DiagError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut out = Dataset::default();
        for (name, values) in columns {
            out.push_column(name, values)?;
        }
        Ok(out)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), DiagError> {
        let name = name.into();
        if self.columns.iter().any(|c| c.name == name) {
            return Err(DiagError::DuplicateColumn { name });
        }
        if self.columns.is_empty() {
            self.n_rows = values.len();
        } else if values.len() != self.n_rows {
            return Err(DiagError::RaggedColumn {
                name,
                expected: self.n_rows,
                got: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&[f64], DiagError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| DiagError::MissingColumn { name: name.to_string() })
    }

    /// Copy out the named columns (in the given order), dropping rows where
    /// any selected cell is missing.
    ///
    /// The dataset itself is never modified. Requesting the same name twice
    /// is an error because the resulting table would have duplicate columns.
    pub fn select(&self, names: &[&str]) -> Result<Selection, DiagError> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut picked = Vec::with_capacity(names.len());
        for &name in names {
            if !seen.insert(name) {
                return Err(DiagError::DuplicateColumn { name: name.to_string() });
            }
            picked.push((name, self.column(name)?));
        }

        let row_index: Vec<usize> = (0..self.n_rows)
            .filter(|&i| picked.iter().all(|(_, values)| values[i].is_finite()))
            .collect();
        let dropped = self.n_rows - row_index.len();

        let mut table = Dataset::default();
        for (name, values) in picked {
            let kept = row_index.iter().map(|&i| values[i]).collect();
            table.push_column(name, kept)?;
        }
        // A selection of columns over zero kept rows still has a defined shape.
        table.n_rows = row_index.len();

        Ok(Selection {
            table,
            row_index,
            dropped,
        })
    }
}
