//! Settings validation.

use anyhow::{bail, Result};

use super::Settings;

/// Validate settings.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.log_path.to_string_lossy().contains('\0') {
        bail!("Invalid log_path: contains null character");
    }

    if settings.schema_file.as_os_str().is_empty() {
        bail!("schema_file cannot be empty");
    }

    match (&settings.config_dir, &settings.config_file) {
        (Some(_), Some(_)) => {
            bail!("config_dir and config_file are mutually exclusive; set only one")
        }
        (None, None) => bail!("one of config_dir or config_file must be set"),
        (Some(dir), None) => {
            if dir.as_os_str().is_empty() {
                bail!("config_dir cannot be empty");
            }
        }
        (None, Some(file)) => {
            if file.is_empty() {
                bail!("config_file cannot be empty");
            }
            if file.contains('/') || file.contains('\\') {
                bail!("config_file '{}' must be a file name, not a path", file);
            }
            if settings.search_path.is_empty() {
                bail!("search_path must list at least one directory when config_file is set");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_directory_layout_is_valid() {
        let settings = Settings {
            config_dir: Some(PathBuf::from("config")),
            ..Settings::default()
        };
        assert!(validate(&settings).is_ok());
    }

    #[test]
    fn test_both_layouts_rejected() {
        let settings = Settings {
            config_dir: Some(PathBuf::from("config")),
            config_file: Some("app.yml".to_string()),
            search_path: vec![PathBuf::from("/etc")],
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_no_layout_rejected() {
        assert!(validate(&Settings::default()).is_err());
    }

    #[test]
    fn test_single_file_requires_search_path() {
        let mut settings = Settings {
            config_file: Some("app.yml".to_string()),
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());

        settings.search_path = vec![PathBuf::from("/etc/app")];
        assert!(validate(&settings).is_ok());
    }

    #[test]
    fn test_config_file_must_be_a_name() {
        let settings = Settings {
            config_dir: None,
            config_file: Some("etc/app.yml".to_string()),
            search_path: vec![PathBuf::from("/")],
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }
}
