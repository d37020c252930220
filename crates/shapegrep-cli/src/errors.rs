//! Error type for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("at least one query must be given with --query or --query-file")]
    MissingQuery,
    #[error("failed to read query file {path}: {source}")]
    ReadQueryFile { path: PathBuf, source: io::Error },
    #[error("search path {path} does not exist")]
    MissingPath { path: PathBuf },
    #[error("failed to serialise results: {0}")]
    SerialiseResults(serde_json::Error),
    #[error("failed to write results: {0}")]
    WriteOutput(#[from] io::Error),
}
