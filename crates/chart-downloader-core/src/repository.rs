//! ChartMuseum HTTP client

use std::time::Duration;

use url::Url;

use crate::error::{DownloadError, Result};
use crate::manifest::Manifest;

/// Path of the manifest endpoint, relative to the repository root
pub const MANIFEST_PATH: &str = "api/charts";

const USER_AGENT: &str = concat!("chart-downloader/", env!("CARGO_PKG_VERSION"));

/// A chart repository reachable over HTTP(S)
#[derive(Debug, Clone)]
pub struct ChartRepository {
    /// Repository root, without trailing slash
    base_url: String,
    client: reqwest::Client,
}

impl ChartRepository {
    /// Create a client for the repository rooted at `url`
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DownloadError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the repository URL
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// HTTP client shared by manifest and artifact requests
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/{}", self.base_url, MANIFEST_PATH)
    }

    /// Resolve an artifact entry from the manifest to a full URL
    pub fn artifact_url(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Fetch and decode the list of charts
    pub async fn fetch_manifest(&self) -> Result<Manifest> {
        let url = self.manifest_url();
        let fetch_error = |message: String| DownloadError::ManifestFetch {
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        Manifest::from_json(&body, &url)
    }
}

/// Whether a manifest URL entry points outside the repository
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
