//! Chart Downloader
//!
//! Mirrors a [ChartMuseum](https://chartmuseum.com) repository into a local
//! `charts/` directory:
//!
//! - **Manifest**: `GET <url>/api/charts`, decoded into [`Manifest`]
//! - **Missing artifacts**: every listed archive whose file is not present yet
//! - **Atomic downloads**: bodies are streamed to `<file>.tmp` and renamed once complete
//! - **Bounded retries**: exponential backoff, 30 seconds per file by default
//!
//! ## Example
//!
//! ```rust,no_run
//! use chart_downloader_core::{ChartDownloader, ChartRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = ChartRepository::new("https://charts.example.com")?;
//! let summary = ChartDownloader::new(repo).run().await?;
//! println!("{} downloaded, {} already present", summary.downloaded, summary.skipped);
//! # Ok(())
//! # }
//! ```
//!
//! Downloads run strictly one after another. A file that cannot be fetched
//! within its retry budget aborts the whole run.

pub mod error;
pub mod manifest;
pub mod progress;
pub mod retry;
pub mod fetch;
pub mod repository;
pub mod downloader;

// Re-exports for convenience
pub use error::{DownloadError, Result};
pub use manifest::{Chart, Maintainer, Manifest};
pub use progress::{ObservedStream, ProgressObserver, TerminalProgress, format_bytes};
pub use retry::RetryPolicy;
pub use fetch::FileFetcher;
pub use repository::ChartRepository;
pub use downloader::{Artifact, ChartDownloader, DEFAULT_CHARTS_DIR, DownloadSummary};
