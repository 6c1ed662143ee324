//! Mirror every chart of a repository into a local directory
//!
//! Artifacts are processed one at a time in manifest order. An artifact whose
//! final file already exists is skipped; anything else is downloaded under the
//! retry policy. A download that exhausts its retry budget ends the run.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::{DownloadError, Result};
use crate::fetch::FileFetcher;
use crate::progress::TerminalProgress;
use crate::repository::{ChartRepository, is_absolute};
use crate::retry::RetryPolicy;

/// Directory artifacts are stored in, relative to the working directory
pub const DEFAULT_CHARTS_DIR: &str = "charts";

/// Prefix stripped from manifest paths to get the local file name
const CHARTS_PREFIX: &str = "charts/";

/// One artifact listed by the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path as listed in the manifest
    pub path: String,
    /// Full source URL
    pub url: String,
    /// Final local file
    pub destination: PathBuf,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Artifact entries listed by the manifest, duplicates included
    pub artifacts: usize,
    /// Entries whose file was already present
    pub skipped: usize,
    /// Entries downloaded during this run
    pub downloaded: usize,
}

/// Drives manifest fetch, missing-artifact detection and downloads
#[derive(Debug)]
pub struct ChartDownloader {
    repository: ChartRepository,
    fetcher: FileFetcher,
    charts_dir: PathBuf,
    retry: RetryPolicy,
    quiet: bool,
}

impl ChartDownloader {
    pub fn new(repository: ChartRepository) -> Self {
        let fetcher = FileFetcher::new(repository.client().clone());
        Self {
            repository,
            fetcher,
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            retry: RetryPolicy::default(),
            quiet: false,
        }
    }

    pub fn with_charts_dir(mut self, charts_dir: impl Into<PathBuf>) -> Self {
        self.charts_dir = charts_dir.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Suppress status lines and the progress display
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn charts_dir(&self) -> &Path {
        &self.charts_dir
    }

    /// Map a manifest path to its source URL and local file.
    ///
    /// The local file always lies inside the charts directory. Paths that
    /// would leave it, or that name no file at all, are rejected.
    pub fn resolve(&self, path: &str) -> Result<Artifact> {
        let file_name = if is_absolute(path) {
            url_file_name(path)?
        } else {
            path.strip_prefix(CHARTS_PREFIX).unwrap_or(path).to_string()
        };

        Ok(Artifact {
            path: path.to_string(),
            url: self.repository.artifact_url(path),
            destination: self.charts_dir.join(contained(path, &file_name)?),
        })
    }

    /// Download every artifact that is not present locally
    pub async fn run(&self) -> Result<DownloadSummary> {
        self.status("Checking for charts...");
        let manifest = self.repository.fetch_manifest().await?;
        let paths = manifest.artifact_paths();
        tracing::debug!(
            charts = manifest.len(),
            artifacts = paths.len(),
            "Fetched chart manifest"
        );

        self.status("Download Started");
        create_charts_dir(&self.charts_dir).await?;

        let mut summary = DownloadSummary {
            artifacts: paths.len(),
            ..Default::default()
        };

        for path in paths {
            let artifact = self.resolve(path)?;
            if is_present(&artifact.destination).await {
                tracing::debug!(path = %artifact.destination.display(), "Chart already present");
                summary.skipped += 1;
                continue;
            }

            self.download(&artifact).await?;
            summary.downloaded += 1;
        }

        self.status("Download Finished");
        Ok(summary)
    }

    /// Download one artifact under the retry policy
    pub async fn download(&self, artifact: &Artifact) -> Result<u64> {
        let bytes = self
            .retry
            .run(&artifact.url, || {
                self.fetcher
                    .fetch(&artifact.url, &artifact.destination, self.progress())
            })
            .await?;

        tracing::info!(
            url = %artifact.url,
            path = %artifact.destination.display(),
            bytes,
            "Downloaded chart"
        );
        Ok(bytes)
    }

    fn progress(&self) -> TerminalProgress<Box<dyn Write + Send>> {
        if self.quiet {
            TerminalProgress::new(Box::new(io::sink()))
        } else {
            TerminalProgress::new(Box::new(io::stdout()))
        }
    }

    fn status(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

fn invalid_path(path: &str, reason: &str) -> DownloadError {
    DownloadError::InvalidArtifactPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Last path segment of an absolute artifact URL, without query or fragment
fn url_file_name(path: &str) -> Result<String> {
    let url = Url::parse(path).map_err(|e| invalid_path(path, &e.to_string()))?;
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid_path(path, "URL has no file name"))
}

/// `file_name` as a path relative to the charts directory
fn contained(path: &str, file_name: &str) -> Result<PathBuf> {
    let relative = Path::new(file_name);
    let mut named = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid_path(path, "escapes the charts directory"));
            }
        }
    }

    if !named {
        return Err(invalid_path(path, "no file name"));
    }
    Ok(relative.to_path_buf())
}

async fn create_charts_dir(dir: &Path) -> Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o777);
    builder.create(dir).await?;
    Ok(())
}

/// Only a definite "not found" counts as missing
async fn is_present(path: &Path) -> bool {
    !matches!(tokio::fs::try_exists(path).await, Ok(false))
}
