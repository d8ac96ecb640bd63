//! Configuration for botcheck.
//!
//! A config file is optional. When present it looks like:
//!
//! ```yaml
//! enabled: true
//! disabled_detectors: [best-practices]
//! excluded_paths: ["**/dist/**"]
//! metadata_path: discord-metadata.json
//! catalog_path: error-catalog.json
//! docs_endpoint: https://paste.example.com/api/docs
//! ```
//!
//! Relative artifact paths are resolved against the directory of the config
//! file they were read from.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::DEFAULT_DETECTORS;

/// Environment variable that turns the analyzer on when the config is silent.
pub const ENABLE_ENV: &str = "BOTCHECK_ANALYZER";

/// Default timeout for documentation lookups.
pub const DEFAULT_DOCS_TIMEOUT_MS: u64 = 3000;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Whether the analysis pipeline runs. Falls back to `BOTCHECK_ANALYZER`,
    /// then to disabled.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Detector names to leave out of the default rule set.
    #[serde(default)]
    pub disabled_detectors: Vec<String>,
    /// Glob patterns for paths to skip when linting a directory.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Metadata artifact replacing the embedded one.
    #[serde(default)]
    pub metadata_path: Option<PathBuf>,
    /// Catalog artifact merged over the embedded one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Remote documentation service; the local example catalog is used when unset.
    #[serde(default)]
    pub docs_endpoint: Option<String>,
    #[serde(default)]
    pub docs_timeout_ms: Option<u64>,
    /// Directory of the file this config was parsed from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(config)
    }

    /// Whether the pipeline is enabled (config, then environment, then off).
    pub fn is_enabled(&self) -> bool {
        self.enabled
            .unwrap_or_else(|| env_flag_enabled(std::env::var(ENABLE_ENV).ok().as_deref()))
    }

    /// Returns the docs lookup timeout (defaults to 3s).
    pub fn docs_timeout_ms(&self) -> u64 {
        self.docs_timeout_ms.unwrap_or(DEFAULT_DOCS_TIMEOUT_MS)
    }

    /// Resolve an artifact path against the config file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Compile `excluded_paths` into a reusable filter.
    pub fn path_filter(&self) -> anyhow::Result<PathFilter> {
        PathFilter::new(&self.excluded_paths)
    }
}

/// Compiled exclusion globs, matched against paths relative to the lint root.
#[derive(Debug, Clone)]
pub struct PathFilter {
    set: GlobSet,
}

impl PathFilter {
    pub fn new(patterns: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }
}

/// Interpret the value of the enable flag.
pub fn env_flag_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

/// Validate a config for common errors.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for name in &config.disabled_detectors {
        if !DEFAULT_DETECTORS.contains(&name.as_str()) {
            anyhow::bail!(
                "unknown detector {:?} in disabled_detectors, expected one of: {}",
                name,
                DEFAULT_DETECTORS.join(", ")
            );
        }
    }

    config.path_filter()?;

    if let Some(endpoint) = &config.docs_endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            anyhow::bail!("docs_endpoint must be an http(s) URL, got {:?}", endpoint);
        }
    }

    Ok(())
}
