//! Configuration file and environment handling
//!
//! Settings are taken from, highest precedence first: the `--url` flag,
//! `CHART_DOWNLOADER_*` environment variables, then the config file
//! (`--config <path>` or `~/.chart-downloader.{yaml,yml,json}`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chart_downloader_core::{DEFAULT_CHARTS_DIR, RetryPolicy};

use crate::error::{CliError, Result};

/// Base name of the config file searched for in the home directory
pub const CONFIG_FILE_NAME: &str = ".chart-downloader";

/// Extensions tried, in order, when searching the home directory
pub const CONFIG_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub const URL_ENV: &str = "CHART_DOWNLOADER_URL";
pub const CHARTS_DIR_ENV: &str = "CHART_DOWNLOADER_CHARTS_DIR";

/// Contents of a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// ChartMuseum server address
    pub url: Option<String>,

    /// Where downloaded charts are stored
    pub charts_dir: Option<PathBuf>,

    /// Retry behavior for individual downloads
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| {
            CliError::config_with_help(
                format!("Invalid config file {}: {}", path.display(), message),
                "Only the url, chartsDir and retry keys are read",
            )
        })
    }

    /// Locate and load the config file.
    ///
    /// An explicit path must exist. Without one, the home directory is
    /// searched and a missing file is not an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load_from(path)?)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            CliError::config_with_help(
                "Could not determine home directory",
                "Set HOME or pass --config <path>",
            )
        })?;

        Self::discover_in(&home)
    }

    /// Search `dir` for `.chart-downloader.<ext>`
    pub fn discover_in(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for ext in CONFIG_EXTENSIONS {
            let path = dir.join(format!("{}.{}", CONFIG_FILE_NAME, ext));
            if path.is_file() {
                let config = Self::load_from(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub charts_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl Settings {
    /// Merge flag, environment and config file values
    pub fn resolve<F>(flag_url: Option<String>, config: Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let url = non_empty(flag_url)
            .or_else(|| non_empty(env(URL_ENV)))
            .or_else(|| non_empty(config.url))
            .ok_or(CliError::MissingUrl)?;

        let charts_dir = non_empty(env(CHARTS_DIR_ENV))
            .map(PathBuf::from)
            .or(config.charts_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHARTS_DIR));

        Ok(Self {
            url,
            charts_dir,
            retry: config.retry,
        })
    }
}
