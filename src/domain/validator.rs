//! Schema validation of section mappings.

use std::collections::BTreeMap;

use serde_yaml::Mapping;

use super::schema::{FieldRule, SectionSchema};
use super::types::{FieldErrors, Section, Value};

/// Validation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only supplied keys are checked; missing required fields are allowed.
    Partial,
    /// Every constraint is enforced, including required fields.
    Full,
}

/// Validates section mappings against a [`SectionSchema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `section` against `schema`.
    ///
    /// Returns the field-level errors when the mapping is invalid.
    pub fn validate(
        &self,
        section: &Section,
        schema: &SectionSchema,
        mode: Mode,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let entries = section.iter().map(|(k, v)| (k.clone(), v));
        check_mapping(entries, schema.fields(), mode, "", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_mapping<'a>(
    entries: impl Iterator<Item = (String, &'a Value)>,
    rules: &BTreeMap<String, FieldRule>,
    mode: Mode,
    prefix: &str,
    errors: &mut FieldErrors,
) {
    let mut seen = Vec::new();

    for (name, value) in entries {
        let path = format!("{}{}", prefix, name);
        match rules.get(&name) {
            Some(rule) => check_value(value, rule, mode, &path, errors),
            None => push(errors, &path, "unknown field".to_string()),
        }
        seen.push(name);
    }

    if mode == Mode::Full {
        for (name, rule) in rules {
            if rule.required && !seen.contains(name) {
                push(errors, &format!("{}{}", prefix, name), "required field".to_string());
            }
        }
    }
}

fn check_value(value: &Value, rule: &FieldRule, mode: Mode, path: &str, errors: &mut FieldErrors) {
    if value.is_null() {
        if !rule.nullable {
            push(errors, path, "null value not allowed".to_string());
        }
        return;
    }

    if let Some(kind) = rule.kind {
        if !kind.matches(value) {
            push(errors, path, format!("must be of {} type", kind.as_str()));
            return;
        }
    }

    if !rule.empty && is_empty(value) {
        push(errors, path, "empty values not allowed".to_string());
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.contains(value) {
            push(errors, path, format!("unallowed value {}", render(value)));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = rule.min {
            if number < min {
                push(errors, path, format!("min value is {}", min));
            }
        }
        if let Some(max) = rule.max {
            if number > max {
                push(errors, path, format!("max value is {}", max));
            }
        }
    }

    if let Some(len) = length(value) {
        if let Some(minlength) = rule.minlength {
            if len < minlength {
                push(errors, path, format!("min length is {}", minlength));
            }
        }
        if let Some(maxlength) = rule.maxlength {
            if len > maxlength {
                push(errors, path, format!("max length is {}", maxlength));
            }
        }
    }

    if let (Some(pattern), Some(text)) = (&rule.regex, value.as_str()) {
        match pattern.full_match(text) {
            Some(true) => {}
            Some(false) => push(
                errors,
                path,
                format!("value does not match regex '{}'", pattern.as_str()),
            ),
            None => push(errors, path, format!("invalid regex '{}'", pattern.as_str())),
        }
    }

    if let (Some(nested), Some(mapping)) = (&rule.schema, value.as_mapping()) {
        check_nested(mapping, nested, mode, path, errors);
    }
}

fn check_nested(
    mapping: &Mapping,
    rules: &BTreeMap<String, FieldRule>,
    mode: Mode,
    path: &str,
    errors: &mut FieldErrors,
) {
    let prefix = format!("{}.", path);
    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        match key.as_str() {
            Some(name) => entries.push((name.to_string(), value)),
            None => push(errors, path, format!("non-string key {}", render(key))),
        }
    }
    check_mapping(entries.into_iter(), rules, mode, &prefix, errors);
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Sequence(seq) => Some(seq.len()),
        _ => None,
    }
}

fn render(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{:?}", value))
}

fn push(errors: &mut FieldErrors, path: &str, message: String) {
    errors.entry(path.to_string()).or_default().push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::FieldType;

    fn section(pairs: &[(&str, Value)]) -> Section {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn app_schema() -> SectionSchema {
        SectionSchema::new()
            .field("debug", FieldRule::of(FieldType::Boolean))
            .field("name", FieldRule::of(FieldType::String).required_full())
    }

    #[test]
    fn test_partial_accepts_missing_required() {
        let validator = Validator::new();
        let data = section(&[("debug", Value::Bool(true))]);

        assert!(validator.validate(&data, &app_schema(), Mode::Partial).is_ok());
    }

    #[test]
    fn test_full_rejects_missing_required() {
        let validator = Validator::new();
        let data = section(&[("debug", Value::Bool(true))]);

        let errors = validator
            .validate(&data, &app_schema(), Mode::Full)
            .unwrap_err();
        assert_eq!(errors["name"], vec!["required field".to_string()]);
    }

    #[test]
    fn test_partial_still_checks_types() {
        let validator = Validator::new();
        let data = section(&[("debug", Value::from(4))]);

        let errors = validator
            .validate(&data, &app_schema(), Mode::Partial)
            .unwrap_err();
        assert_eq!(errors["debug"], vec!["must be of boolean type".to_string()]);
    }

    #[test]
    fn test_partial_still_checks_empty() {
        let validator = Validator::new();
        let data = section(&[("name", Value::from(""))]);

        let errors = validator
            .validate(&data, &app_schema(), Mode::Partial)
            .unwrap_err();
        assert_eq!(errors["name"], vec!["empty values not allowed".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let validator = Validator::new();
        let data = section(&[("colour", Value::from("blue"))]);

        let errors = validator
            .validate(&data, &app_schema(), Mode::Partial)
            .unwrap_err();
        assert!(errors.contains_key("colour"));
    }

    #[test]
    fn test_null_handling() {
        let validator = Validator::new();
        let schema = SectionSchema::new()
            .field("strict", FieldRule::of(FieldType::String))
            .field("loose", FieldRule::of(FieldType::String).nullable());

        let data = section(&[("loose", Value::Null)]);
        assert!(validator.validate(&data, &schema, Mode::Full).is_ok());

        let data = section(&[("strict", Value::Null)]);
        assert!(validator.validate(&data, &schema, Mode::Full).is_err());
    }

    #[test]
    fn test_allowed_range_and_regex() {
        let validator = Validator::new();
        let schema = SectionSchema::new()
            .field(
                "level",
                FieldRule::of(FieldType::String)
                    .allowed(vec![Value::from("debug"), Value::from("info")]),
            )
            .field(
                "port",
                FieldRule::of(FieldType::Integer).range(Some(1.0), Some(65535.0)),
            )
            .field("host", FieldRule::of(FieldType::String).regex("[a-z.]+"));

        let ok = section(&[
            ("level", Value::from("info")),
            ("port", Value::from(8080)),
            ("host", Value::from("example.com")),
        ]);
        assert!(validator.validate(&ok, &schema, Mode::Full).is_ok());

        let bad = section(&[
            ("level", Value::from("trace")),
            ("port", Value::from(70000)),
            ("host", Value::from("Example.com")),
        ]);
        let errors = validator.validate(&bad, &schema, Mode::Full).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["port"], vec!["max value is 65535".to_string()]);
    }

    #[test]
    fn test_float_accepts_integers() {
        let validator = Validator::new();
        let schema = SectionSchema::new().field("timeout", FieldRule::of(FieldType::Float));

        let data = section(&[("timeout", Value::from(3))]);
        assert!(validator.validate(&data, &schema, Mode::Full).is_ok());

        let data = section(&[("timeout", Value::from(2.5))]);
        assert!(validator.validate(&data, &schema, Mode::Full).is_ok());

        let data = section(&[("timeout", Value::from("3"))]);
        let errors = validator.validate(&data, &schema, Mode::Full).unwrap_err();
        assert_eq!(errors["timeout"], vec!["must be of float type".to_string()]);
    }

    #[test]
    fn test_nested_schema_reports_dotted_paths() {
        let validator = Validator::new();
        let db = SectionSchema::new()
            .field("host", FieldRule::of(FieldType::String).required_full())
            .field("port", FieldRule::of(FieldType::Integer));
        let schema =
            SectionSchema::new().field("db", FieldRule::of(FieldType::Dict).nested(db));

        let data: Section =
            serde_yaml::from_str("db:\n  port: not-a-number\n").unwrap();

        let partial = validator
            .validate(&data, &schema, Mode::Partial)
            .unwrap_err();
        assert!(partial.contains_key("db.port"));
        assert!(!partial.contains_key("db.host"));

        let full = validator.validate(&data, &schema, Mode::Full).unwrap_err();
        assert_eq!(full["db.host"], vec!["required field".to_string()]);
    }
}
