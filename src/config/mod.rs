//! Configuration system for yamlsync.
//!
//! Settings are read from `~/.config/yamlsync/config.toml`. Every field has a
//! default, so a partial file only overrides what it names, and a missing or
//! unreadable file yields `Config::default()`.
//!
//! # Example
//!
//! ```
//! use yamlsync::config::{Config, StaleSelection};
//!
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert_eq!(config.stale_selection, StaleSelection::NearestAncestor);
//!
//! let custom = Config {
//!     indent_size: 4,
//!     ..Config::default()
//! };
//! assert_eq!(custom.error_highlight_ms, 5000);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What happens to the selected path when an edit removes its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StaleSelection {
    /// Leave the dangling path selected
    Keep,
    /// Drop the selection
    Clear,
    /// Move to the closest ancestor that still exists
    #[default]
    NearestAncestor,
}

/// Configuration for the yamlsync engine and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indentation level for inserted and formatted text
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// How long a parse error stays highlighted, in milliseconds
    #[serde(default = "default_error_highlight_ms")]
    pub error_highlight_ms: u64,

    /// How long inserted text stays highlighted, in milliseconds
    #[serde(default = "default_insertion_highlight_ms")]
    pub insertion_highlight_ms: u64,

    #[serde(default)]
    pub stale_selection: StaleSelection,

    /// Seed the expanded set with the top-level paths on the first parse
    #[serde(default = "default_expand_top_level")]
    pub expand_top_level: bool,
}

fn default_indent_size() -> usize {
    2
}

fn default_error_highlight_ms() -> u64 {
    5000
}

fn default_insertion_highlight_ms() -> u64 {
    3000
}

fn default_expand_top_level() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            error_highlight_ms: default_error_highlight_ms(),
            insertion_highlight_ms: default_insertion_highlight_ms(),
            stale_selection: StaleSelection::default(),
            expand_top_level: default_expand_top_level(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/yamlsync/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("yamlsync");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// is missing or does not parse.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                Self::default()
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read config file");
                Self::default()
            }
        }
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    pub fn error_highlight(&self) -> Duration {
        Duration::from_millis(self.error_highlight_ms)
    }

    pub fn insertion_highlight(&self) -> Duration {
        Duration::from_millis(self.insertion_highlight_ms)
    }

    /// The indentation unit, never less than one space.
    pub fn indent_unit(&self) -> usize {
        self.indent_size.max(1)
    }
}
