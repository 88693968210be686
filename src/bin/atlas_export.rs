//! Atlas export binary.
//!
//! Loads a serialized animation document, extracts its symbols, shapes and
//! sequences, packs the shape bounds onto pages and prints the result as
//! JSON on stdout. Shapes without bounds are reported at INFO and left out
//! of the layout.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ATLAS_CONFIG`: path to an `ExportConfig` JSON file (default: built-in defaults)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! Logs go to stderr so stdout stays valid JSON.
//!
//! ## Usage
//!
//! ```bash
//! LOG_FORMAT=pretty cargo run --bin atlas_export -- document.json > export.json
//! ```

use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use symbol_atlas::{
    build_export_set, layout_shape_bounds, run_pass, ConfigError, ExportConfig, ExportError,
    ExportReport, ExportSet, InMemoryDocument, PassStatus, SpriteManifest, SpritesheetError,
};

/// Errors that abort the export.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Layout(#[from] SpritesheetError),
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atlas_export=info,symbol_atlas=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// What the binary prints.
#[derive(Serialize)]
struct ExportOutput {
    export: ExportSet,
    layout: SpriteManifest,
}

fn load_config() -> Result<ExportConfig, CliError> {
    match std::env::var("ATLAS_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading config");
            Ok(ExportConfig::from_file(&path)?)
        }
        Err(_) => Ok(ExportConfig::default()),
    }
}

fn export(document_path: &str, config: &ExportConfig) -> ExportReport<ExportOutput> {
    run_pass("atlas_export", |log| -> Result<ExportOutput, CliError> {
        let json = std::fs::read_to_string(document_path).map_err(|source| CliError::Read {
            path: document_path.to_string(),
            source,
        })?;
        let document = InMemoryDocument::from_json(&json)?;

        let export = build_export_set(&document, config)?;
        log.extend(export.issues.iter().cloned());

        let layout = layout_shape_bounds(&export, config, log)?;
        Ok(ExportOutput { export, layout })
    })
}

fn main() -> ExitCode {
    init_tracing();

    let Some(document_path) = std::env::args().nth(1) else {
        eprintln!("usage: atlas_export <document.json>");
        return ExitCode::from(2);
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid config");
            return ExitCode::from(2);
        }
    };

    let report = export(&document_path, &config);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!(error = %e, "Failed to serialize report");
            return ExitCode::FAILURE;
        }
    }

    if report.output.is_none() {
        return ExitCode::FAILURE;
    }
    if report.status == PassStatus::CompletedWithErrors {
        info!(issues = report.issues.len(), "Export completed with errors");
    }
    ExitCode::SUCCESS
}
