//! Error types for sectioncfg.

use std::fmt;

use thiserror::Error;

use super::types::FieldErrors;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Boxed error returned by hooks and collaborator traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for sectioncfg.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested section has no schema entry.
    #[error("No schema defined for section '{0}'")]
    SchemaNotFound(String),

    /// The section has a schema but no value after refreshing.
    #[error("Section '{0}' was not found after refresh")]
    SectionNotFound(String),

    /// Section data failed schema validation.
    #[error("Errors validating section '{section}':\n\n{}", render_errors(.errors))]
    Validation { section: String, errors: FieldErrors },

    /// The backing storage container does not exist.
    #[error("Unable to get config from bucket '{bucket}': {message}")]
    ConfigurationNotFound { bucket: String, message: String },

    /// A registered hook failed.
    #[error("{stage} for section '{section}' failed: {message}")]
    Hook {
        section: String,
        stage: HookStage,
        message: String,
    },

    /// The document could not be parsed (save path only).
    #[error("Failed to parse document for section '{section}': {source}")]
    Parse {
        section: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Storage backend failure other than a missing key or bucket.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption failed while saving a section.
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// The document source cannot be written to.
    #[error("Document source '{0}' is read-only")]
    ReadOnlySource(String),

    /// The global configuration was installed twice.
    #[error("Global configuration is already installed")]
    AlreadyInstalled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Field-level errors for a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConfigError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Extension point that produced a [`ConfigError::Hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Pre,
    Merge,
    Post,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Pre => f.write_str("prehook"),
            HookStage::Merge => f.write_str("mergehook"),
            HookStage::Post => f.write_str("posthook"),
        }
    }
}

fn render_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}
