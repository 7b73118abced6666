//! Settings service for loading settings files and building the configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use sectioncfg::{Config, ConfigBuilder, Defaults, DirectorySource, Schema, SingleFileSource};

use super::types::default_log_path_for_settings_dir;
use super::Settings;

/// Settings service.
pub struct SettingsService;

impl SettingsService {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sectioncfg")
            .join("settings.toml")
    }

    /// Load settings from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// Relative paths in the file are resolved against its directory.
    /// Log path defaults to the same directory as the settings file.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let settings_dir = path.parent();

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        // If log_path was not explicitly set, use the settings file directory
        let general_default = default_log_path_for_settings_dir(None);
        if settings.log_path == general_default {
            settings.log_path = default_log_path_for_settings_dir(settings_dir);
        }

        if let Some(dir) = settings_dir {
            settings.resolve_relative_to(dir);
        }

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    /// Build the configuration described by `settings`.
    pub fn build_config(settings: &Settings) -> Result<Config> {
        let schema_text = fs::read_to_string(&settings.schema_file).with_context(|| {
            format!("Failed to read schema file: {}", settings.schema_file.display())
        })?;
        let schema = Schema::from_yaml_str(&schema_text).with_context(|| {
            format!("Invalid schema in {}", settings.schema_file.display())
        })?;

        let defaults = match &settings.defaults_file {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read defaults file: {}", path.display()))?;
                Defaults::from_yaml_str(&text)
                    .with_context(|| format!("Invalid defaults in {}", path.display()))?
            }
            None => Defaults::new(),
        };

        let builder = match (&settings.config_dir, &settings.config_file) {
            (_, Some(file)) => ConfigBuilder::single_file(
                schema,
                SingleFileSource::new(settings.search_path.clone(), file.clone()),
            ),
            (Some(dir), None) => ConfigBuilder::new(schema, DirectorySource::new(dir)),
            (None, None) => anyhow::bail!("one of config_dir or config_file must be set"),
        };

        let config = builder
            .defaults(defaults)
            .refresh_seconds(settings.refresh_seconds)
            .build()?;
        Ok(config)
    }

    /// Generate default settings file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default settings file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_settings_content())
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    /// Default settings content with comments.
    fn default_settings_content() -> String {
        r#"# sectioncfg settings file
# Relative paths are resolved against the directory of this file.

# YAML schema: top-level keys are section names, values are field rules
schema_file = "schema.yml"

# Optional YAML defaults, keyed by section name
# defaults_file = "defaults.yml"

# One <section>.yml file per section in this directory
config_dir = "config"

# Alternatively, every section in one file found on a search path
# (remove config_dir when using these)
# config_file = "app.yml"
# search_path = [".", "/etc/myapp"]

# Seconds before a loaded section is considered stale (default: 60)
refresh_seconds = 60

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: same directory as settings.toml/logs)
# log_path = "~/.config/sectioncfg/logs"
"#
        .to_string()
    }
}
