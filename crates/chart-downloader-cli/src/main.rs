//! chart-downloader - mirror a ChartMuseum repository into ./charts

use clap::{CommandFactory, FromArgMatches, Parser};
use console::style;
use miette::Diagnostic;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use chart_downloader_core::{ChartDownloader, ChartRepository};

mod config;
mod error;
mod exit_codes;
mod version;

use config::{Config, Settings};
use error::{CliError, Result};
use version::BuildInfo;

#[derive(Parser)]
#[command(name = "chart-downloader")]
#[command(author = "Chart Downloader Contributors")]
#[command(about = "Downloads chartmuseum charts into ./charts folder")]
#[command(
    long_about = "Downloads chartmuseum charts into ./charts folder. Will retry failed GET requests and only download charts that do not already exist."
)]
struct Cli {
    /// The address of the chartmuseum server you want to download from, e.g. https://kubernetes-charts.storage.googleapis.com
    #[arg(long)]
    url: Option<String>,

    /// config file (default is $HOME/.chart-downloader.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Parse arguments, reporting `build` through `--version`
    fn parse_with(build: &BuildInfo) -> Self {
        let command = Cli::command()
            .version(build.version_or(version::FALLBACK_VERSION))
            .long_version(build.long_version());

        let matches = command.get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

/// Log to stderr; `RUST_LOG` overrides the default `warn` level
fn init_logging() -> LogHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    handle
}

fn main() {
    // Setup miette for nice panic display
    miette::set_panic_hook();

    let log_handle = init_logging();
    let build = BuildInfo::from_build_env();
    let cli = Cli::parse_with(&build);

    if cli.debug {
        let _ = log_handle.reload(EnvFilter::new("debug"));
    }
    tracing::debug!(
        version = build.version(),
        revision = %build.revision,
        "Starting chart-downloader"
    );

    if let Err(err) = run(cli) {
        report(&err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match Config::discover(cli.config.as_deref())? {
        Some((path, config)) => {
            println!("Using config file: {}", style(path.display()).dim());
            config
        }
        None => Config::default(),
    };

    let settings = Settings::resolve(cli.url, config, |key| std::env::var(key).ok())?;

    let repository = ChartRepository::new(&settings.url)?;
    let downloader = ChartDownloader::new(repository)
        .with_charts_dir(settings.charts_dir)
        .with_retry(settings.retry);
    tracing::debug!(
        url = %settings.url,
        charts_dir = %downloader.charts_dir().display(),
        "Mirroring charts"
    );

    // Downloads are strictly sequential; one thread is all they need
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("Failed to start runtime: {}", e)))?;

    let summary = runtime.block_on(downloader.run())?;
    tracing::debug!(
        artifacts = summary.artifacts,
        skipped = summary.skipped,
        downloaded = summary.downloaded,
        "Mirror up to date"
    );

    Ok(())
}

/// Print a fatal error to stdout
fn report(err: &CliError) {
    println!("{} {}", style("Error:").red().bold(), err);
    if let Some(help) = err.help() {
        println!("  {} {}", style("help:").cyan(), help);
    }
}
