//! Editor configuration.
//!
//! Loaded once at startup from TOML in the user's config directory. Missing
//! or unreadable files fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pts_persistence::{AutoSaveConfig, write_text};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// Undo depth used when the config does not say otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Placeholder in build arguments replaced by the source path.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder in build arguments replaced by the output path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo snapshots kept per session.
    pub history_limit: usize,

    pub auto_save: AutoSaveConfig,

    pub build: BuildConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            auto_save: AutoSaveConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Ignoring unreadable config");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| EditorError::Config {
            reason: e.to_string(),
        })?;
        write_text(path, &content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "PowerTableStudio", "PTS")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

/// External blob compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub program: String,

    /// Arguments; `{input}` and `{output}` are substituted.
    pub args: Vec<String>,

    /// The compiler is killed after this many seconds.
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "dtc".to_string(),
            args: ["-I", "dts", "-O", "dtb", "-o", OUTPUT_PLACEHOLDER, INPUT_PLACEHOLDER]
                .map(str::to_string)
                .to_vec(),
            timeout_secs: 120,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Arguments with both placeholders filled in.
    pub fn resolved_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}
