//! User configuration
//!
//! The interaction constants below define the drop feel and are not meant to
//! be tuned per user. Runtime settings come from an optional TOML file.

use crossterm::event::KeyCode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// DROP ZONES
// ============================================================================

/// Columns from the left/right screen edge that form a full-column split zone
pub const SCREEN_EDGE_W: i32 = 4;

/// Rows from the top/bottom screen edge that form a full-row split zone
pub const SCREEN_EDGE_H: i32 = 2;

/// Fraction of a pane's width/height that counts as its edge
pub const PANE_EDGE_FRAC: f64 = 0.28;

/// Rows reserved for the footer at the bottom of the surface
pub const FOOTER_H: i32 = 1;

// ============================================================================
// PANE BOXES
// ============================================================================

/// Smallest scaled box that still fits a border and a label
pub const MIN_PANE_W: i32 = 5;
pub const MIN_PANE_H: i32 = 3;

/// Maximum characters kept from a pane title
pub const TITLE_MAX: usize = 24;

/// Title set on the calling pane while we run
pub const SENTINEL_TITLE: &str = "tmux-pane-mover";

// ============================================================================
// KEYBINDINGS
// ============================================================================

pub const KEY_QUIT: KeyCode = KeyCode::Char('q');
pub const KEY_RELOAD: KeyCode = KeyCode::Char('r');

// ============================================================================
// SETTINGS FILE
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from `config.toml`
///
/// ```toml
/// tmux = "/usr/local/bin/tmux"
/// info_timeout_ms = 2000
/// error_timeout_ms = 4000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// tmux binary to invoke
    pub tmux: String,
    /// How long a drop notice stays in the footer
    pub info_timeout_ms: u64,
    /// How long a failed-action notice stays in the footer
    pub error_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmux: "tmux".to_string(),
            info_timeout_ms: 2000,
            error_timeout_ms: 4000,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `$XDG_CONFIG_HOME/tmux-pane-mover/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tmux-pane-mover").join("config.toml"))
    }
}
