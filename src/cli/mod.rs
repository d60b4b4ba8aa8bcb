//! Command-line parsing for `regdiag`.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and diagnostics code. Flags are turned into a `DiagConfig` by
//! `app::diag_config_from_check` and `app::diag_config_from_demo`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_X_LABEL, DEFAULT_Y_LABEL};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "regdiag", version, about = "OLS regression diagnostics for CSV data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model on a CSV file and print the summary, assumption checks and residual plot.
    Check(CheckArgs),
    /// Same output as `check`, on a seeded synthetic dataset.
    Demo(DemoArgs),
    /// Browse the summary and residual chart in a terminal UI.
    Tui(CheckArgs),
}

/// Inputs for `check` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// CSV file with a header row. Prompts with a file picker when omitted.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Target column.
    #[arg(short, long, conflicts_with = "formula")]
    pub target: Option<String>,

    /// Feature columns, comma separated. Defaults to every other numeric column.
    #[arg(long, value_delimiter = ',', requires = "target")]
    pub features: Vec<String>,

    /// Model formula, e.g. "SalePrice ~ LotArea + GrLivArea".
    #[arg(long)]
    pub formula: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Inputs for `demo`.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub rows: usize,

    /// True coefficients, one per feature column (`x1`, `x2`, ...).
    #[arg(long = "coef", value_delimiter = ',', default_values_t = [2.0, 3.0])]
    pub coefficients: Vec<f64>,

    /// True intercept.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub intercept: f64,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Diagnostics, plot and export options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Fraction of rows in the central Rainbow sub-sample, in (0, 1).
    #[arg(long, default_value_t = 0.5)]
    pub rainbow_frac: f64,

    /// Sort rows by this feature before taking the Rainbow sub-sample.
    #[arg(long, value_name = "COLUMN")]
    pub rainbow_order_by: Option<String>,

    /// Include an intercept in the VIF auxiliary regressions (centered R²).
    #[arg(long)]
    pub vif_constant: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, env = "REGDIAG_PLOT_WIDTH", default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, env = "REGDIAG_PLOT_HEIGHT", default_value_t = 24)]
    pub height: usize,

    /// X axis label.
    #[arg(long, env = "REGDIAG_X_LABEL", default_value = DEFAULT_X_LABEL)]
    pub x_label: String,

    /// Y axis label.
    #[arg(long, env = "REGDIAG_Y_LABEL", default_value = DEFAULT_Y_LABEL)]
    pub y_label: String,

    /// Also write the residual plot as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export per-row residuals to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_parses_feature_list() {
        let cli = Cli::try_parse_from([
            "regdiag", "check", "--csv", "houses.csv", "-t", "SalePrice", "--features", "LotArea,GrLivArea",
            "--no-plot",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.target.as_deref(), Some("SalePrice"));
        assert_eq!(args.features, ["LotArea", "GrLivArea"]);
        assert!(args.output.no_plot);
        assert_eq!(args.output.rainbow_frac, 0.5);
    }

    #[test]
    fn formula_conflicts_with_target() {
        let res = Cli::try_parse_from(["regdiag", "check", "--formula", "y ~ a", "--target", "y"]);
        assert!(res.is_err());
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::try_parse_from(["regdiag", "demo", "--intercept", "-1.5"]).unwrap();
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.rows, 100);
        assert_eq!(args.coefficients, [2.0, 3.0]);
        assert_eq!(args.intercept, -1.5);
    }
}
