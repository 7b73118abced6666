//! Declarative section schemas.
//!
//! A schema maps section names to per-field rule sets. Rules use the
//! familiar cerberus-style keys, so a schema can be written in YAML:
//!
//! ```yaml
//! app:
//!   debug:
//!     type: boolean
//!   name:
//!     type: string
//!     required: true
//!     empty: false
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::Value;

/// Value type accepted by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Number,
    Boolean,
    List,
    Dict,
}

impl FieldType {
    /// Whether `value` is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_bool(),
            FieldType::List => value.is_sequence(),
            FieldType::Dict => value.is_mapping(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Dict => "dict",
        }
    }
}

/// Regular expression a string value must match in full.
///
/// Compiled once when the rule is built or deserialized. An invalid
/// pattern is kept so [`Schema::check`] can report it with its path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: std::result::Result<Regex, regex::Error>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&format!("^(?:{})$", source));
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether all of `text` matches; `None` if the pattern does not compile.
    pub fn full_match(&self, text: &str) -> Option<bool> {
        self.compiled.as_ref().ok().map(|re| re.is_match(text))
    }

    pub fn error(&self) -> Option<&regex::Error> {
        self.compiled.as_ref().err()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Validation rules for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRule {
    /// Expected value type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldType>,

    /// Field must be present (full validation only)
    #[serde(default)]
    pub required: bool,

    /// Whether empty strings, lists and dicts are accepted
    #[serde(default = "default_true")]
    pub empty: bool,

    /// Whether null is accepted
    #[serde(default)]
    pub nullable: bool,

    /// Exhaustive list of permitted values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minlength: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<usize>,

    /// Pattern the whole string must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<Pattern>,

    /// Rules for the keys of a `dict` value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BTreeMap<String, FieldRule>>,
}

fn default_true() -> bool {
    true
}

impl Default for FieldRule {
    fn default() -> Self {
        Self {
            kind: None,
            required: false,
            empty: true,
            nullable: false,
            allowed: None,
            min: None,
            max: None,
            minlength: None,
            maxlength: None,
            regex: None,
            schema: None,
        }
    }
}

impl FieldRule {
    /// Rule that only checks the value type.
    pub fn of(kind: FieldType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Copy of this rule that rejects empty values.
    pub fn not_empty(&self) -> Self {
        Self {
            empty: false,
            ..self.clone()
        }
    }

    /// Copy of this rule that is required and rejects empty values.
    pub fn required_full(&self) -> Self {
        Self {
            required: true,
            ..self.not_empty()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn allowed(mut self, values: Vec<Value>) -> Self {
        self.allowed = Some(values);
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(Pattern::new(pattern));
        self
    }

    pub fn nested(mut self, fields: SectionSchema) -> Self {
        self.schema = Some(fields.fields);
        self
    }
}

/// Field rules for a single section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionSchema {
    fields: BTreeMap<String, FieldRule>,
}

impl SectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field rule.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldRule> {
        &self.fields
    }
}

impl From<BTreeMap<String, FieldRule>> for SectionSchema {
    fn from(fields: BTreeMap<String, FieldRule>) -> Self {
        Self { fields }
    }
}

/// Immutable schema for a whole configuration, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    sections: BTreeMap<String, SectionSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section schema.
    pub fn section(mut self, name: impl Into<String>, schema: SectionSchema) -> Self {
        self.sections.insert(name.into(), schema);
        self
    }

    /// Parse a schema from YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let sections: Option<BTreeMap<String, SectionSchema>> = serde_yaml::from_str(content)?;
        let schema = Self {
            sections: sections.unwrap_or_default(),
        };
        schema.check()?;
        Ok(schema)
    }

    /// Parse a schema from raw YAML bytes.
    pub fn from_yaml_slice(content: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(content)?;
        Self::from_yaml_str(content)
    }

    pub fn get(&self, name: &str) -> Option<&SectionSchema> {
        self.sections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Declared section names, in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Reject rules that can never be evaluated.
    pub fn check(&self) -> Result<()> {
        for (section, schema) in &self.sections {
            check_fields(section, schema.fields())?;
        }
        Ok(())
    }
}

fn check_fields(path: &str, fields: &BTreeMap<String, FieldRule>) -> Result<()> {
    for (name, rule) in fields {
        if let Some(pattern) = &rule.regex {
            if let Some(e) = pattern.error() {
                bail!(
                    "{}.{}: invalid regex pattern '{}': {}",
                    path,
                    name,
                    pattern.as_str(),
                    e
                );
            }
        }

        if let (Some(min), Some(max)) = (rule.min, rule.max) {
            if min > max {
                bail!("{}.{}: min ({}) is greater than max ({})", path, name, min, max);
            }
        }

        if let Some(nested) = &rule.schema {
            if rule.kind.is_some_and(|kind| kind != FieldType::Dict) {
                bail!("{}.{}: nested schema requires type dict", path, name);
            }
            check_fields(&format!("{}.{}", path, name), nested)?;
        }
    }
    Ok(())
}
