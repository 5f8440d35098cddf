//! Options and discoverable project configuration for the rewrite pipeline.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "fingerprint.config.json";

/// Default manifest file name, relative to the pipeline output directory.
pub const DEFAULT_MANIFEST_FILE: &str = ".assets-manifest.json";

/// Programmatic options controlling one rewrite pipeline run.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Master switch; when `false` only an empty manifest is written.
    pub enabled: bool,
    /// Emit diagnostic lines for exclusions, rewrites and the persisted manifest.
    pub verbose: bool,
    /// Public-facing path prefix; falls back to the pipeline default when unset.
    pub public_path: Option<String>,
    /// Manifest output path, absolute or relative to the output directory.
    pub file_name: String,
    /// Artifacts whose source reference matches any pattern keep their original name.
    pub exclude: Vec<Regex>,
    /// Rewrite references inside rendered HTML pages.
    pub use_replacing_in_html: bool,
    /// Rewrite references inside general emitted text assets.
    pub use_replacing_in_assets: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            public_path: None,
            file_name: DEFAULT_MANIFEST_FILE.into(),
            exclude: Vec::new(),
            use_replacing_in_html: true,
            use_replacing_in_assets: true,
        }
    }
}

/// Discoverable project configuration mirroring [`RewriteOptions`] as JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Master switch; when `false` only an empty manifest is written.
    pub enabled: bool,
    /// Emit diagnostic lines while processing.
    pub verbose: bool,
    /// Public-facing path prefix; falls back to the pipeline default when unset.
    pub public_path: Option<String>,
    /// Manifest output path, absolute or relative to the output directory.
    pub file_name: String,
    /// Exclusion patterns matched against source reference paths.
    pub exclude: Vec<String>,
    /// Rewrite references inside rendered HTML pages.
    pub use_replacing_in_html: bool,
    /// Rewrite references inside general emitted text assets.
    pub use_replacing_in_assets: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            public_path: None,
            file_name: DEFAULT_MANIFEST_FILE.into(),
            exclude: Vec::new(),
            use_replacing_in_html: true,
            use_replacing_in_assets: true,
        }
    }
}

impl ProjectConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file does not exist or fails to parse we fall back
    /// to default values so downstream callers can continue operating with
    /// sensible assumptions.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Convert the configuration into runtime options, compiling the exclusion
    /// patterns.
    pub fn into_options(self) -> Result<RewriteOptions> {
        let mut exclude = Vec::with_capacity(self.exclude.len());
        for pattern in &self.exclude {
            let compiled = Regex::new(pattern)
                .with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
            exclude.push(compiled);
        }

        Ok(RewriteOptions {
            enabled: self.enabled,
            verbose: self.verbose,
            public_path: self.public_path,
            file_name: self.file_name,
            exclude,
            use_replacing_in_html: self.use_replacing_in_html,
            use_replacing_in_assets: self.use_replacing_in_assets,
        })
    }
}
