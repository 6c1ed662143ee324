//! Build metadata reported by `--version`

use semver::Version;

/// Prefix stripped before parsing a version string
pub const VERSION_PREFIX: &str = "v";

/// Version reported when the build did not provide one
pub const FALLBACK_VERSION: &str = "0.0.1";

/// Build information, captured at compile time and passed to the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub revision: String,
    pub branch: String,
    pub build_user: String,
    pub build_date: String,
    pub rustc_version: String,
}

impl BuildInfo {
    /// Read `CHART_DOWNLOADER_*` variables set by the release build.
    ///
    /// Falls back to the crate version when no explicit version was provided.
    pub fn from_build_env() -> Self {
        Self {
            version: option_env!("CHART_DOWNLOADER_VERSION")
                .unwrap_or(env!("CARGO_PKG_VERSION"))
                .to_string(),
            revision: option_env!("CHART_DOWNLOADER_REVISION")
                .unwrap_or_default()
                .to_string(),
            branch: option_env!("CHART_DOWNLOADER_BRANCH")
                .unwrap_or_default()
                .to_string(),
            build_user: option_env!("CHART_DOWNLOADER_BUILD_USER")
                .unwrap_or_default()
                .to_string(),
            build_date: option_env!("CHART_DOWNLOADER_BUILD_DATE")
                .unwrap_or_default()
                .to_string(),
            rustc_version: option_env!("CHART_DOWNLOADER_RUSTC_VERSION")
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Raw version string, never empty
    pub fn version(&self) -> &str {
        if self.version.is_empty() {
            FALLBACK_VERSION
        } else {
            &self.version
        }
    }

    pub fn semver(&self) -> Result<Version, semver::Error> {
        Version::parse(self.version().trim_start_matches(VERSION_PREFIX))
    }

    /// Normalized version, or `default` when the version is not valid semver
    pub fn version_or(&self, default: &str) -> String {
        match self.semver() {
            Ok(v) => v.to_string(),
            Err(e) => {
                tracing::warn!("Failed to load version: {}", e);
                default.to_string()
            }
        }
    }

    /// Key/value pairs in display order
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("version", self.version()),
            ("revision", self.revision.as_str()),
            ("branch", self.branch.as_str()),
            ("buildUser", self.build_user.as_str()),
            ("buildDate", self.build_date.as_str()),
            ("rustcVersion", self.rustc_version.as_str()),
        ]
    }

    /// Multi-line block for `--version`, skipping unknown fields
    pub fn long_version(&self) -> String {
        let mut lines = vec![self.version_or(FALLBACK_VERSION)];
        lines.extend(
            self.entries()
                .iter()
                .skip(1)
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| format!("{}: {}", key, value)),
        );
        lines.join("\n")
    }
}
