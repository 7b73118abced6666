//! Test doubles for code that consumes configuration.

use std::collections::BTreeMap;

use crate::domain::{Section, Value};

/// In-memory configuration with no schema, hooks or I/O.
///
/// Unknown sections are empty and unknown keys read as an empty string, so
/// tests only need to declare the settings they care about.
#[derive(Debug, Clone, Default)]
pub struct FakeConfig {
    sections: BTreeMap<String, Section>,
}

impl FakeConfig {
    pub fn new(sections: BTreeMap<String, Section>) -> Self {
        Self { sections }
    }

    /// Parse sections from YAML, e.g. `"app:\n  debug: true\n"`.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let sections: Option<BTreeMap<String, Section>> = serde_yaml::from_str(content)?;
        Ok(Self::new(sections.unwrap_or_default()))
    }

    pub fn section(&self, name: &str) -> FakeSection {
        FakeSection {
            values: self.sections.get(name).cloned().unwrap_or_default(),
        }
    }
}

/// One section of a [`FakeConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeSection {
    values: Section,
}

impl FakeSection {
    /// Value for `key`, or an empty string when unset.
    pub fn get(&self, key: &str) -> Value {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    pub fn values(&self) -> &Section {
        &self.values
    }
}
