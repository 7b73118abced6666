//! Document source trait definition.

use super::DocumentSnapshot;
use crate::domain::{ConfigError, Result, Section};

/// Trait for section document sources.
pub trait DocumentSource: Send + Sync {
    /// Read the document for `section_name`.
    ///
    /// An absent or unparseable document is an empty section, not an error.
    fn read_section(&self, section_name: &str) -> Result<Section>;

    /// Store already-validated document bytes for `section_name`.
    fn write_section(&self, section_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        let _ = (section_name, contents);
        Err(ConfigError::ReadOnlySource(self.name()))
    }

    /// Re-read the document shared by every section and return it.
    ///
    /// Only whole-document sources have one; others return `None`.
    fn reload(&self) -> Result<Option<DocumentSnapshot>> {
        Ok(None)
    }

    /// Human-readable name for logging.
    fn name(&self) -> String;
}
