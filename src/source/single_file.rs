//! Whole configuration in a single file found on a search path.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::document::parse_document;
use super::DocumentSource;
use crate::domain::{Result, Section};

/// One parsed version of a whole document.
///
/// Cheap to clone; every clone serves the same sections.
#[derive(Debug, Clone, Default)]
pub struct DocumentSnapshot {
    origin: String,
    sections: Arc<BTreeMap<String, Section>>,
}

impl DocumentSnapshot {
    pub fn new(origin: impl Into<String>, sections: BTreeMap<String, Section>) -> Self {
        Self {
            origin: origin.into(),
            sections: Arc::new(sections),
        }
    }

    /// Top-level keys of the document, sorted.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn contains(&self, section_name: &str) -> bool {
        self.sections.contains_key(section_name)
    }
}

impl DocumentSource for DocumentSnapshot {
    fn read_section(&self, section_name: &str) -> Result<Section> {
        Ok(self.sections.get(section_name).cloned().unwrap_or_default())
    }

    fn name(&self) -> String {
        self.origin.clone()
    }
}

/// One document whose top-level keys are section names.
///
/// The document is read by [`DocumentSource::reload`]; sections are then
/// served from that snapshot until the next reload.
#[derive(Debug)]
pub struct SingleFileSource {
    search_path: Vec<PathBuf>,
    file_name: String,
    current: RwLock<DocumentSnapshot>,
}

impl SingleFileSource {
    pub fn new(search_path: Vec<PathBuf>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let origin = format!("file:{}", file_name);
        Self {
            search_path,
            file_name,
            current: RwLock::new(DocumentSnapshot::new(origin, BTreeMap::new())),
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// First candidate directory that contains the file.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(|dir| dir.join(&self.file_name))
            .find(|candidate| candidate.is_file())
    }

    /// The snapshot taken by the last reload.
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.current.read().clone()
    }
}

impl DocumentSource for SingleFileSource {
    fn read_section(&self, section_name: &str) -> Result<Section> {
        self.current.read().read_section(section_name)
    }

    fn reload(&self) -> Result<Option<DocumentSnapshot>> {
        let sections = match self.resolve_path() {
            Some(path) => match fs::read(&path) {
                Ok(bytes) => {
                    info!("Loading configuration from {}", path.display());
                    parse_document(&path.display().to_string(), &bytes)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
                Err(e) => return Err(e.into()),
            },
            None => {
                debug!(
                    "{} not found on search path {:?}",
                    self.file_name, self.search_path
                );
                BTreeMap::new()
            }
        };

        let snapshot = DocumentSnapshot::new(self.name(), sections);
        *self.current.write() = snapshot.clone();
        Ok(Some(snapshot))
    }

    fn name(&self) -> String {
        format!("file:{}", self.file_name)
    }
}
