//! Interactive CSV picker for `regdiag check` without `--csv`.
//!
//! clap handles flags; this module only lists `*.csv` files under the working
//! directory and reads a choice from stdin.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// How many directory levels below the working directory are searched.
const SEARCH_DEPTH: usize = 4;

/// Directories never descended into.
const SKIP_DIRS: [&str; 4] = [".git", "target", "node_modules", ".venv"];

/// What a line of user input resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Path(PathBuf),
    Invalid(String),
    Quit,
}

/// List discovered CSV files and prompt until the user picks one.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found here. Pass one with `regdiag check --csv <file.csv>`.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, display_path(path));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Dataset number (1-{}) or path, q to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let Some(line) = lines.next() else {
            return Err(AppError::new(2, "No input received. Pass a CSV with `--csv <file.csv>`."));
        };
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        match interpret_choice(&line, &files) {
            Choice::Path(path) => return Ok(path),
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Invalid(msg) => println!("{msg}"),
        }
    }
}

/// Resolve one line of input against the listed files.
pub fn interpret_choice(input: &str, files: &[PathBuf]) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match files.get(n.wrapping_sub(1)) {
            Some(path) => Choice::Path(path.clone()),
            None => Choice::Invalid(format!("No file numbered {n}; pick 1-{}.", files.len())),
        };
    }
    match validate_csv_path(Path::new(input)) {
        Ok(path) => Choice::Path(path),
        Err(err) => Choice::Invalid(err.to_string()),
    }
}

/// Validate that the path is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(2, format!("Expected a file, got a directory: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(2, format!("Expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by display path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| display_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if !SKIP_DIRS.contains(&name) {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
