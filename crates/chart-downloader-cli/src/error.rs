//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use chart_downloader_core::DownloadError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// No repository URL from flag, environment or config file
    #[error(
        "You must enter a url for the chartmuseum server you want to download from using the --url flag"
    )]
    #[diagnostic(code(chart_downloader::cli::usage))]
    MissingUrl,

    /// Config file or home directory problem
    #[error("Config error: {message}")]
    #[diagnostic(code(chart_downloader::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest, network or retry failure
    #[error(transparent)]
    #[diagnostic(code(chart_downloader::cli::download))]
    Download(#[from] DownloadError),

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chart_downloader::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingUrl
            | CliError::Config { .. }
            | CliError::Download(_)
            | CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a config error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
