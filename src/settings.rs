//! Persisted user preferences: template document, output directory and
//! output file base name.
//!
//! Stored as pretty-printed JSON in `<config_dir>/settings.json`, where
//! `config_dir` is the platform configuration directory (e.g.
//! `~/.config/gpt2doc/` on Linux) or `$GPT2DOC_CONFIG_DIR` when set. Missing
//! keys fall back to their defaults, so older files keep loading.

use crate::error::Gpt2DocError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reference document looked up next to where the tool is run.
pub const DEFAULT_TEMPLATE: &str = "Temple.docx";
/// Output file name (without extension) used until the user picks one.
pub const DEFAULT_FILENAME_BASE: &str = "output";
/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";
/// Overrides the platform config directory.
pub const CONFIG_DIR_ENV: &str = "GPT2DOC_CONFIG_DIR";

/// The three user-settable conversion options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reference document pandoc copies styles from.
    pub template_file: PathBuf,
    /// Directory the converted document is written to.
    pub output_dir: PathBuf,
    /// Output file name without the `.docx` extension.
    pub filename_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        let app_dir = app_dir();
        Self {
            template_file: app_dir.join(DEFAULT_TEMPLATE),
            output_dir: app_dir,
            filename_base: DEFAULT_FILENAME_BASE.to_string(),
        }
    }
}

fn app_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Directory holding the settings file, if one can be determined.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("io", "gpt2doc", "gpt2doc")
        .map(|d| d.config_dir().to_path_buf())
}

/// Full path of the settings file.
pub fn settings_path() -> Result<PathBuf, Gpt2DocError> {
    config_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .ok_or(Gpt2DocError::NoConfigDir)
}

impl Settings {
    /// Load from the default location; defaults when nothing was saved yet.
    pub fn load() -> Result<Self, Gpt2DocError> {
        Self::load_from(&settings_path()?)
    }

    /// Load from `path`; defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, Gpt2DocError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                debug!("Loaded settings from {}", path.display());
                serde_json::from_str(&json).map_err(|e| Gpt2DocError::SettingsParse {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Gpt2DocError::SettingsRead {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Save to the default location, returning the path written.
    pub fn save(&self) -> Result<PathBuf, Gpt2DocError> {
        let path = settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), Gpt2DocError> {
        let write_err = |e| Gpt2DocError::SettingsWrite {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Gpt2DocError::Internal(format!("settings serialisation: {e}")))?;
        fs::write(path, json).map_err(write_err)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}
