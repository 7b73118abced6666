//! Settings data types.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::validation;

/// Settings for the command-line tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// YAML schema describing every section
    pub schema_file: PathBuf,

    /// Optional YAML file with default values per section
    pub defaults_file: Option<PathBuf>,

    /// Directory holding one `<section>.yml` per section
    pub config_dir: Option<PathBuf>,

    /// Single file holding every section (alternative to `config_dir`)
    pub config_file: Option<String>,

    /// Directories searched, in order, for `config_file`
    pub search_path: Vec<PathBuf>,

    /// Age in seconds before a section is reloaded
    pub refresh_seconds: u64,

    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::from("schema.yml"),
            defaults_file: None,
            config_dir: None,
            config_file: None,
            search_path: Vec::new(),
            refresh_seconds: sectioncfg::service::DEFAULT_REFRESH_SECONDS,
            debug: false,
            log_path: default_log_path(),
        }
    }
}

impl Settings {
    /// Validate settings and return errors if invalid.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Resolve relative paths against the directory holding the settings file.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &Path| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };

        self.schema_file = resolve(self.schema_file.as_path());
        self.defaults_file = self.defaults_file.as_deref().map(resolve);
        self.config_dir = self.config_dir.as_deref().map(resolve);
        self.search_path = self.search_path.iter().map(|p| resolve(p.as_path())).collect();
    }
}

/// Get default log path (relative to settings directory).
/// This returns a placeholder; the actual path is set by SettingsService based on settings file location.
pub fn default_log_path() -> PathBuf {
    default_log_path_for_settings_dir(None)
}

/// Get log path based on settings directory.
pub fn default_log_path_for_settings_dir(settings_dir: Option<&Path>) -> PathBuf {
    settings_dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("sectioncfg")
        })
        .join("logs")
}
