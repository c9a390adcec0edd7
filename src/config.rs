// Designer configuration, stored as RON

use crate::command::policy::CoalescePolicy;
use crate::command::stack::DEFAULT_MAX_DEPTH;
use log::warn;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "myform_designer";
const CONFIG_FILE: &str = "config.ron";
const DEFAULT_CLIPBOARD_CAPACITY: usize = 10;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Undo history settings applied to every new project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum undo entries per project, 0 for unlimited
    pub max_depth: usize,
    pub coalesce: CoalescePolicy,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            coalesce: CoalescePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Number of copied items kept
    pub capacity: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CLIPBOARD_CAPACITY,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    pub history: HistoryConfig,
    pub clipboard: ClipboardConfig,
}

impl DesignerConfig {
    /// `<config dir>/myform_designer/config.ron`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Load from the default path, falling back to defaults on any problem
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|err| {
                warn!("Ignoring config at {}: {}", path.display(), err);
                Self::default()
            }),
            _ => Self::default(),
        }
    }
}
