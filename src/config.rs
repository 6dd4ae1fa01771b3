//! Configuration file support for gv.
//!
//! Config file location: `~/.config/gv/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! base_branch = "develop"
//! context_lines = 1
//! layout = "unified"
//! theme = "light"
//! hidden_files = ["Cargo.lock", "flake.lock"]
//!
//! [colors]
//! accent = "#ff8800"
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{HiddenFilter, LayoutMode, DEFAULT_HIDDEN_FILES};

/// Context sizes the `x` key cycles through.
pub const CONTEXT_CHOICES: [u32; 3] = [3, 1, 0];

/// Errors loading an explicitly requested config file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// User configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Branch to diff against; detected when unset.
    pub base_branch: Option<String>,
    /// Basenames hidden until `h` is pressed.
    pub hidden_files: Vec<String>,
    /// Initial context lines (0, 1 or 3).
    pub context_lines: u32,
    /// `"split"` or `"unified"`.
    pub layout: Option<String>,
    /// Built-in theme name.
    pub theme: Option<String>,
    /// Per-color `#rrggbb` overrides on top of the theme.
    pub colors: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_branch: None,
            hidden_files: DEFAULT_HIDDEN_FILES.iter().map(|s| s.to_string()).collect(),
            context_lines: 3,
            layout: None,
            theme: None,
            colors: HashMap::new(),
        }
    }
}

impl Config {
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("gv").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("gv").join("config.toml"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("gv").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// First existing config file on the search path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load from the search path.
    ///
    /// Returns defaults when no file exists or the file cannot be parsed.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                warn!(error = %err, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load a specific file; any failure is an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Context lines, falling back to 3 for unsupported values.
    pub fn context_lines(&self) -> u32 {
        normalize_context(self.context_lines)
    }

    /// Layout mode; unknown names fall back to side-by-side.
    pub fn layout_mode(&self) -> LayoutMode {
        match self.layout.as_deref() {
            None | Some("split") | Some("sbs") | Some("side-by-side") => LayoutMode::SideBySide,
            Some("unified") => LayoutMode::Unified,
            Some(other) => {
                warn!(layout = other, "unknown layout; using split");
                LayoutMode::SideBySide
            }
        }
    }

    /// Filter built from `hidden_files`.
    pub fn hidden_filter(&self) -> HiddenFilter {
        HiddenFilter::new(self.hidden_files.iter().cloned())
    }
}

/// Map a context size onto the supported set.
pub fn normalize_context(lines: u32) -> u32 {
    if CONTEXT_CHOICES.contains(&lines) {
        lines
    } else {
        3
    }
}

/// Next context size in the 3 → 1 → 0 → 3 cycle.
pub fn next_context(lines: u32) -> u32 {
    match normalize_context(lines) {
        3 => 1,
        1 => 0,
        _ => 3,
    }
}
