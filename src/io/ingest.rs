//! CSV ingest and normalization.
//!
//! Turns a header-row CSV into a numeric `Dataset`:
//! - **Header cleanup**: trimmed, BOM stripped, case preserved (model column
//!   names must match exactly)
//! - **Missing cells** (`""`, `NA`, `NaN`, `null`) become `NaN` and are dropped
//!   later, row-wise, only if the model actually uses that column
//! - **Non-numeric columns** are skipped and reported, never fatal on their own

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Dataset;
use crate::error::AppError;

/// Cell spellings treated as "no value".
const MISSING_TOKENS: [&str; 5] = ["", "na", "nan", "null", "n/a"];

/// A column left out of the dataset because it holds non-numeric text.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedColumn {
    pub name: String,
    /// 1-based CSV line of the first offending cell.
    pub line: usize,
    pub sample: String,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the numeric table plus what was left behind.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub skipped: Vec<SkippedColumn>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a CSV file into a numeric dataset.
pub fn load_dataset(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_dataset(file)
}

/// Read CSV text from any reader into a numeric dataset.
pub fn read_dataset<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if names.iter().all(|n| n.is_empty()) {
        return Err(AppError::new(2, "CSV has no header row."));
    }

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut first_bad: Vec<Option<(usize, String)>> = vec![None; names.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        rows_read += 1;

        if record.len() != names.len() {
            row_errors.push(RowError {
                line,
                message: format!("expected {} fields, found {}; missing cells read as NaN", names.len(), record.len()),
            });
        }

        push_record(&record, line, &mut values, &mut first_bad);
    }

    let mut dataset = Dataset::default();
    let mut skipped = Vec::new();
    for ((name, column), bad) in names.into_iter().zip(values).zip(first_bad) {
        if name.is_empty() {
            continue;
        }
        if let Some((line, sample)) = bad {
            tracing::debug!(column = %name, line, "skipping non-numeric column");
            skipped.push(SkippedColumn { name, line, sample });
            continue;
        }
        dataset.push_column(name, column).map_err(AppError::from)?;
    }

    if dataset.n_columns() == 0 {
        return Err(AppError::new(2, "CSV has no numeric columns."));
    }
    if rows_read == 0 {
        return Err(AppError::new(3, "CSV has a header but no data rows."));
    }

    Ok(IngestedData {
        dataset,
        skipped,
        row_errors,
        rows_read,
    })
}

fn push_record(
    record: &StringRecord,
    line: usize,
    values: &mut [Vec<f64>],
    first_bad: &mut [Option<(usize, String)>],
) {
    for (col, out) in values.iter_mut().enumerate() {
        let cell = record.get(col).unwrap_or("");
        match parse_cell(cell) {
            Some(v) => out.push(v),
            None => {
                if first_bad[col].is_none() {
                    first_bad[col] = Some((line, cell.to_string()));
                }
                out.push(f64::NAN);
            }
        }
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, column lookups fail.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

/// `Some(NaN)` for a missing cell, `Some(v)` for a number, `None` for text.
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Some(f64::NAN);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { Some(f64::NAN) }
}

/// One line per skipped column, for stderr.
pub fn describe_skipped(skipped: &[SkippedColumn]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| format!("Skipped non-numeric column `{}` (line {}: '{}')", s.name, s.line, s.sample))
        .collect()
}
