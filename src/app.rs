//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments into a `DiagConfig`
//! - loads the dataset (CSV or synthetic)
//! - runs the diagnostics pipeline and writes optional exports

use std::io::{self, Write};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{CheckArgs, Command, DemoArgs, OutputArgs};
use crate::data::{generate_linear_sample, sample_feature_names, SAMPLE_TARGET};
use crate::domain::{
    DataSource, Dataset, DiagConfig, DiagOptions, ModelSpec, PlotLabels, PlotOptions, RainbowOptions, SampleConfig,
    VifOptions,
};
use crate::error::AppError;

pub mod pipeline;

pub use pipeline::{analyze, execute, run_with_writer, RunOutput};

/// Entry point for the `regdiag` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Check(args) => {
            let config = diag_config_from_check(&args)?;
            handle_check(&config)
        }
        Command::Demo(args) => handle_check(&diag_config_from_demo(&args)),
        Command::Tui(args) => {
            let config = diag_config_from_check(&args)?;
            let (dataset, spec) = load_inputs(&config)?;
            crate::tui::run(&dataset, &spec, &config.options)
        }
    }
}

/// Log to stderr so stdout carries only the report. `RUST_LOG` overrides the
/// default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_check(config: &DiagConfig) -> Result<(), AppError> {
    let (dataset, spec) = load_inputs(config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let run = run_with_writer(&dataset, &spec, &config.options, &mut out)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write output: {e}")))?;

    if let Some(path) = &config.export_results {
        crate::io::write_residuals_csv(path, &run.residuals)?;
        info!(path = %path.display(), rows = run.residuals.len(), "exported residuals");
    }
    if let Some(path) = &config.export_json {
        crate::io::write_report_json(path, &run.report)?;
        info!(path = %path.display(), "exported report");
    }
    Ok(())
}

/// Load the dataset named by the config and resolve the model to fit.
pub fn load_inputs(config: &DiagConfig) -> Result<(Dataset, ModelSpec), AppError> {
    let dataset = match &config.source {
        DataSource::Csv(path) => {
            let ingest = crate::io::load_dataset(path)?;
            for msg in crate::io::describe_skipped(&ingest.skipped) {
                warn!("{msg}");
            }
            for err in &ingest.row_errors {
                warn!(line = err.line, "{}", err.message);
            }
            info!(rows = ingest.rows_read, columns = ingest.dataset.n_columns(), "loaded CSV");
            ingest.dataset
        }
        DataSource::Synthetic(sample) => generate_linear_sample(sample)?,
    };

    let spec = match &config.model {
        Some(spec) => spec.clone(),
        None => pipeline::default_spec(&dataset, config.target.as_deref().unwrap_or(SAMPLE_TARGET))?,
    };
    Ok((dataset, spec))
}

/// Build the run config for `check`/`tui`, prompting for a CSV when none was given.
pub fn diag_config_from_check(args: &CheckArgs) -> Result<DiagConfig, AppError> {
    let path = match &args.csv {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };
    let model = model_from_args(args)?;
    Ok(DiagConfig {
        source: DataSource::Csv(path),
        model,
        target: args.target.clone(),
        options: diag_options_from_args(&args.output),
        export_results: args.output.export.clone(),
        export_json: args.output.export_json.clone(),
    })
}

/// Build the run config for `demo`: target `y` on `x1..xk`.
pub fn diag_config_from_demo(args: &DemoArgs) -> DiagConfig {
    let sample = SampleConfig {
        rows: args.rows,
        coefficients: args.coefficients.clone(),
        intercept: args.intercept,
        noise_sd: args.noise,
        seed: args.seed,
    };
    let features = sample_feature_names(sample.coefficients.len());
    DiagConfig {
        source: DataSource::Synthetic(sample),
        // Generation rejects an empty coefficient list with the same error.
        model: ModelSpec::new(SAMPLE_TARGET, &features).ok(),
        target: None,
        options: diag_options_from_args(&args.output),
        export_results: args.output.export.clone(),
        export_json: args.output.export_json.clone(),
    }
}

/// `--formula` wins; otherwise `--target` with `--features`. `None` leaves the
/// choice to `load_inputs` (target on every other column).
fn model_from_args(args: &CheckArgs) -> Result<Option<ModelSpec>, AppError> {
    if let Some(formula) = &args.formula {
        return Ok(Some(ModelSpec::parse_formula(formula)?));
    }
    match &args.target {
        Some(target) if !args.features.is_empty() => Ok(Some(ModelSpec::new(target.as_str(), &args.features)?)),
        _ => Ok(None),
    }
}

pub fn diag_options_from_args(args: &OutputArgs) -> DiagOptions {
    DiagOptions {
        rainbow: RainbowOptions {
            frac: args.rainbow_frac,
            order_by: args.rainbow_order_by.clone(),
        },
        vif: VifOptions {
            add_constant: args.vif_constant,
        },
        plot: PlotOptions {
            ascii: !args.no_plot,
            width: args.width,
            height: args.height,
            svg_path: args.svg.clone(),
            labels: PlotLabels {
                x: args.x_label.clone(),
                y: args.y_label.clone(),
            },
        },
    }
}
