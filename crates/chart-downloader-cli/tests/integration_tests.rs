//! Integration tests for the chart-downloader binary

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MYCHART_MANIFEST: &str =
    r#"{"mychart":[{"name":"mychart","version":"1.0.0","urls":["charts/mychart-1.0.0.tgz"]}]}"#;

/// Run chart-downloader in `workdir` with an isolated home directory
fn chart_downloader(workdir: &Path, home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chart-downloader"))
        .args(args)
        .current_dir(workdir)
        .env("HOME", home)
        .env_remove("CHART_DOWNLOADER_URL")
        .env_remove("CHART_DOWNLOADER_CHARTS_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute chart-downloader")
}

async fn chart_server(manifest: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/charts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .mount(&server)
        .await;
    server
}

mod usage {
    use super::*;

    #[test]
    fn test_missing_url_fails() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(work.path(), home.path(), &[]);

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("You must enter a url"));
        assert!(!work.path().join("charts").exists());
    }

    #[test]
    fn test_empty_url_fails() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--url", ""]);

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("--url flag"));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(
            work.path(),
            home.path(),
            &["--config", "does-not-exist.yaml", "--url", "http://localhost"],
        );

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Config error"));
    }

    #[test]
    fn test_version() {
        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--version"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }
}

mod download {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_downloads_missing_chart() {
        let server = chart_server(MYCHART_MANIFEST).await;
        Mock::given(method("GET"))
            .and(path("/charts/mychart-1.0.0.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::create_dir(work.path().join("charts")).unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--url", &server.uri()]);

        assert!(output.status.success(), "{:?}", output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Checking for charts..."));
        assert!(stdout.contains("Download Started"));
        assert!(stdout.contains("Downloading... 13 B complete"));
        assert!(stdout.contains("Download Finished"));

        let target = work.path().join("charts/mychart-1.0.0.tgz");
        assert_eq!(std::fs::read(&target).unwrap(), b"archive bytes");
        assert!(!work.path().join("charts/mychart-1.0.0.tgz.tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_present_chart_is_not_requested() {
        let server = chart_server(MYCHART_MANIFEST).await;
        Mock::given(method("GET"))
            .and(path("/charts/mychart-1.0.0.tgz"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::create_dir(work.path().join("charts")).unwrap();
        std::fs::write(work.path().join("charts/mychart-1.0.0.tgz"), "local").unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--url", &server.uri()]);

        assert!(output.status.success(), "{:?}", output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("Downloading..."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_creates_charts_dir() {
        let server = chart_server(MYCHART_MANIFEST).await;
        Mock::given(method("GET"))
            .and(path("/charts/mychart-1.0.0.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x"))
            .mount(&server)
            .await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--url", &server.uri()]);

        assert!(output.status.success(), "{:?}", output);
        assert!(work.path().join("charts/mychart-1.0.0.tgz").is_file());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_url_from_home_config_file() {
        let server = chart_server(MYCHART_MANIFEST).await;
        Mock::given(method("GET"))
            .and(path("/charts/mychart-1.0.0.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("from config"))
            .expect(1)
            .mount(&server)
            .await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(".chart-downloader.yaml"),
            format!("url: {}\n", server.uri()),
        )
        .unwrap();

        let output = chart_downloader(work.path(), home.path(), &[]);

        assert!(output.status.success(), "{:?}", output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Using config file:"));
        assert_eq!(
            std::fs::read_to_string(work.path().join("charts/mychart-1.0.0.tgz")).unwrap(),
            "from config"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_url_from_environment() {
        let server = chart_server("{}").await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_chart-downloader"))
            .current_dir(work.path())
            .env("HOME", home.path())
            .env("CHART_DOWNLOADER_URL", server.uri())
            .output()
            .expect("Failed to execute chart-downloader");

        assert!(output.status.success(), "{:?}", output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Download Finished"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_manifest_fails() {
        let server = chart_server("this is not json").await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let output = chart_downloader(work.path(), home.path(), &["--url", &server.uri()]);

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Invalid chart manifest"));
        assert!(!stdout.contains("Download Started"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_exhausted_retries_fail_the_run() {
        let server = chart_server(
            r#"{"a":[{"name":"a","version":"1.0.0","urls":["charts/a-1.0.0.tgz"]}],
                "b":[{"name":"b","version":"1.0.0","urls":["charts/b-1.0.0.tgz"]}]}"#,
        )
        .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/charts/.+\.tgz$"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let work = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let config = work.path().join("fast-retry.yaml");
        std::fs::write(
            &config,
            "retry:\n  initialInterval: 10ms\n  maxInterval: 50ms\n  maxElapsedTime: 300ms\n",
        )
        .unwrap();

        let output = chart_downloader(
            work.path(),
            home.path(),
            &[
                "--config",
                config.to_str().unwrap(),
                "--url",
                &server.uri(),
            ],
        );

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Giving up on"));
        assert!(!stdout.contains("Download Finished"));
        assert!(!work.path().join("charts/a-1.0.0.tgz").exists());
        assert!(!work.path().join("charts/b-1.0.0.tgz").exists());
    }
}
