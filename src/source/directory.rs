//! Per-section files in a local directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::document::parse_section;
use super::{section_file_name, DocumentSource};
use crate::domain::{Result, Section};

/// Reads `<dir>/<section_name>.yml` for each section.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `section_name`.
    pub fn path_for_section(&self, section_name: &str) -> PathBuf {
        self.dir.join(section_file_name(section_name))
    }
}

impl DocumentSource for DirectorySource {
    fn read_section(&self, section_name: &str) -> Result<Section> {
        let path = self.path_for_section(section_name);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Read section '{}' from {}", section_name, path.display());
                Ok(parse_section(&path.display().to_string(), &bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document for section '{}' at {}", section_name, path.display());
                Ok(Section::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_section(&self, section_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for_section(section_name);
        fs::write(&path, contents)?;
        debug!("Wrote section '{}' to {}", section_name, path.display());
        Ok(contents.to_vec())
    }

    fn name(&self) -> String {
        format!("directory:{}", self.dir.display())
    }
}
