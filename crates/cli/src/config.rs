//! Settings file loading.
//!
//! Settings come from a TOML file (explicit `--config` path, or
//! `<config dir>/slide-explainer/config.toml` when present) and are then
//! overridden by command-line flags.
//!
//! ```toml
//! output_dir = "explanations"
//!
//! [llm]
//! model = "gpt-4o-mini"
//! timeout_secs = 30
//! max_concurrency = 4
//! ```

use anyhow::{Context, Result};
use explainer_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "slide-explainer";
const CONFIG_FILE: &str = "config.toml";

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where reports are written (default: next to each input).
    pub output_dir: Option<PathBuf>,
    /// Language-model backend settings.
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if it exists, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// `<config dir>/slide-explainer/config.toml`, if the platform has a config
/// directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
