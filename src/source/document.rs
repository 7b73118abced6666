//! YAML document loading.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{ConfigError, Result, Section, Value};

/// Parse a section document leniently.
///
/// Anything that is not a string-keyed mapping becomes an empty section.
pub fn parse_section(origin: &str, bytes: &[u8]) -> Section {
    match serde_yaml::from_slice::<Value>(bytes) {
        Ok(value) => into_section(origin, value),
        Err(e) => {
            warn!("Ignoring unparseable document {}: {}", origin, e);
            Section::new()
        }
    }
}

/// Parse a section document, failing on invalid YAML.
///
/// An empty document is an empty section.
pub fn parse_section_strict(section_name: &str, bytes: &[u8]) -> Result<Section> {
    let parsed: Option<Section> =
        serde_yaml::from_slice(bytes).map_err(|source| ConfigError::Parse {
            section: section_name.to_string(),
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

/// Parse a whole-configuration document whose top-level keys are section names.
///
/// Sections whose value is not a mapping are dropped.
pub fn parse_document(origin: &str, bytes: &[u8]) -> BTreeMap<String, Section> {
    let top = parse_section(origin, bytes);
    let mut sections = BTreeMap::new();
    for (name, value) in top {
        match value {
            Value::Mapping(_) => {
                sections.insert(name.clone(), into_section(&format!("{}#{}", origin, name), value));
            }
            Value::Null => {
                sections.insert(name, Section::new());
            }
            _ => warn!("Ignoring non-mapping section '{}' in {}", name, origin),
        }
    }
    sections
}

fn into_section(origin: &str, value: Value) -> Section {
    match value {
        Value::Mapping(mapping) => {
            let mut section = Section::new();
            for (key, value) in mapping {
                match key {
                    Value::String(key) => {
                        section.insert(key, value);
                    }
                    other => warn!("Ignoring non-string key {:?} in {}", other, origin),
                }
            }
            section
        }
        Value::Null => Section::new(),
        _ => {
            warn!("Document {} is not a mapping, treating as empty", origin);
            Section::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section() {
        let section = parse_section("test", b"---\nhost: localhost\nport: 80\n");
        assert_eq!(section.get("host"), Some(&Value::from("localhost")));
        assert_eq!(section.get("port"), Some(&Value::from(80)));
    }

    #[test]
    fn test_parse_section_non_mapping_is_empty() {
        assert!(parse_section("test", b"- a\n- b\n").is_empty());
        assert!(parse_section("test", b"just a string").is_empty());
        assert!(parse_section("test", b"").is_empty());
    }

    #[test]
    fn test_parse_section_invalid_yaml_is_empty() {
        assert!(parse_section("test", b"key: [unclosed").is_empty());
    }

    #[test]
    fn test_parse_section_strict_rejects_invalid_yaml() {
        let err = parse_section_strict("app", b"key: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref section, .. } if section == "app"));
    }

    #[test]
    fn test_parse_section_strict_empty_document() {
        assert!(parse_section_strict("app", b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document(
            "config.yml",
            b"app:\n  debug: true\ndb:\nbroken: 3\n",
        );
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["app"].get("debug"), Some(&Value::Bool(true)));
        assert!(doc["db"].is_empty());
        assert!(!doc.contains_key("broken"));
    }
}
