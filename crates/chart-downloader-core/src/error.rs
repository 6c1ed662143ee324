//! Error types for manifest and artifact downloads

use std::time::Duration;

use thiserror::Error;

/// Download operation errors
#[derive(Debug, Error)]
pub enum DownloadError {
    // ============ Configuration Errors ============
    #[error("Invalid repository URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    // ============ Manifest Errors ============
    #[error("Failed to fetch chart manifest from {url}: {message}")]
    ManifestFetch { url: String, message: String },

    #[error("Invalid chart manifest from {url}: {message}")]
    ManifestParse { url: String, message: String },

    #[error("Invalid artifact path {path}: {reason}")]
    InvalidArtifactPath { path: String, reason: String },

    // ============ Network Errors ============
    #[error("HTTP error: {status} - {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    // ============ Retry Errors ============
    #[error("Giving up on {url} after {}s of retries: {source}", elapsed.as_secs())]
    RetriesExhausted {
        url: String,
        elapsed: Duration,
        #[source]
        source: Box<DownloadError>,
    },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for download operations
pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            DownloadError::Network {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            DownloadError::HttpStatus {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            DownloadError::Network {
                message: e.to_string(),
            }
        }
    }
}
