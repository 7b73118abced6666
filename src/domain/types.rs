//! Core data types shared by the loader, sources and validator.

use std::collections::BTreeMap;

pub use serde_yaml::Value;

/// One configuration section: field name to value.
///
/// Also used for section defaults and for the raw document read from a
/// source. Values returned from the cache are shared and must be treated
/// as read-only.
pub type Section = BTreeMap<String, Value>;

/// Field name to list of violation descriptions.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Default values for every section, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    sections: BTreeMap<String, Section>,
}

impl Defaults {
    /// Create an empty set of defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the defaults for one section.
    pub fn with_section(mut self, name: impl Into<String>, section: Section) -> Self {
        self.sections.insert(name.into(), section);
        self
    }

    /// Parse defaults from a YAML document whose top-level keys are section names.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let sections: Option<BTreeMap<String, Section>> = serde_yaml::from_str(content)?;
        Ok(Self {
            sections: sections.unwrap_or_default(),
        })
    }

    /// Defaults for a section; a fresh empty mapping when none are declared.
    ///
    /// Always returns an owned copy so hooks can never mutate the shared defaults.
    pub fn section(&self, name: &str) -> Section {
        self.sections.get(name).cloned().unwrap_or_default()
    }

    /// Section names that carry defaults.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, Section>> for Defaults {
    fn from(sections: BTreeMap<String, Section>) -> Self {
        Self { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_section_returns_copy() {
        let mut app = Section::new();
        app.insert("debug".to_string(), Value::Bool(false));
        let defaults = Defaults::new().with_section("app", app);

        let mut copy = defaults.section("app");
        copy.insert("debug".to_string(), Value::Bool(true));

        assert_eq!(defaults.section("app").get("debug"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_defaults_missing_section_is_empty() {
        assert!(Defaults::new().section("missing").is_empty());
    }

    #[test]
    fn test_defaults_from_yaml() {
        let defaults = Defaults::from_yaml_str("app:\n  debug: true\ndb:\n  port: 5432\n").unwrap();
        let names: Vec<&str> = defaults.section_names().collect();
        assert_eq!(names, vec!["app", "db"]);
        assert_eq!(defaults.section("db").get("port"), Some(&Value::from(5432)));
    }

    #[test]
    fn test_defaults_from_empty_yaml() {
        let defaults = Defaults::from_yaml_str("").unwrap();
        assert_eq!(defaults.section_names().count(), 0);
    }
}
