//! ChartMuseum manifest types
//!
//! The `/api/charts` endpoint returns every chart known to the server, keyed by
//! chart name, with one entry per published version:
//!
//! ```json
//! {
//!   "dex": [
//!     {
//!       "name": "dex",
//!       "version": "0.1.1",
//!       "urls": ["charts/dex-0.1.1.tgz"],
//!       "digest": "34ec5deb42e6d9550ce1416f4f4bf20abd8f9b77110d4c7cfb70a30b38553c3f"
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DownloadError, Result};

/// Every chart served by a repository, keyed by chart name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: HashMap<String, Vec<Chart>>,
}

impl Manifest {
    /// Parse a manifest from a JSON response body
    pub fn from_json(body: &[u8], url: &str) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| DownloadError::ManifestParse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Flatten the manifest into the relative path of every artifact.
    ///
    /// Chart names come out in map order; versions and URLs keep the order the
    /// server listed them in. Duplicates are kept.
    pub fn artifact_paths(&self) -> Vec<&str> {
        self.entries
            .values()
            .flat_map(|versions| versions.iter())
            .flat_map(|chart| chart.urls.iter().map(String::as_str))
            .collect()
    }

    /// All versions of a chart
    pub fn versions(&self, name: &str) -> Option<&[Chart]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// List all chart names
    pub fn chart_names(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One published version of a chart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    #[serde(default)]
    pub name: String,

    /// Home URL
    #[serde(default)]
    pub home: Option<String>,

    /// Chart version (semver)
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub maintainers: Vec<Maintainer>,

    /// Icon URL
    #[serde(default)]
    pub icon: Option<String>,

    /// Version of the packaged application
    #[serde(default)]
    pub app_version: Option<String>,

    /// Artifact locations, relative to the repository root
    #[serde(default)]
    pub urls: Vec<String>,

    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created: String,

    /// SHA256 digest of the archive. Not verified.
    #[serde(default)]
    pub digest: String,
}

/// Maintainer of a chart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Maintainer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}
