#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for verba report extraction.
//!
//! [`process`] handles one report, [`batch`] runs a directory of them with a
//! per-document deadline, and [`index`] flattens parsed reports into search
//! documents.

pub mod batch;
pub mod index;
pub mod process;

use std::path::{Path, PathBuf};

use verba_report_models::ExtractConfig;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input path does not name a readable file.
    #[error("{0}: not a file")]
    InvalidInput(PathBuf),

    #[error(transparent)]
    Extract(#[from] verba_extract::ExtractError),

    #[error(transparent)]
    Output(#[from] verba_output::OutputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// A document did not finish within the batch deadline.
    #[error("{document}: timed out after {secs}s")]
    Timeout { document: String, secs: u64 },

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}: unsupported input type")]
    UnsupportedInput(PathBuf),
}

/// Loads extraction settings from a TOML file, or the defaults when no
/// file is given.
///
/// # Errors
///
/// Returns [`CliError`] if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<ExtractConfig, CliError> {
    let Some(path) = path else {
        return Ok(ExtractConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = ExtractConfig::from_toml_str(&contents)?;
    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}
