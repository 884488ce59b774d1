//! Validated settings schema for a tool's tunables.
//!
//! Each tool declares a small set of named fields with a default value, an
//! optional constraint (inclusive numeric range or enumerated values) and a
//! human-readable description. The schema is pure data: it is constructed
//! once to obtain defaults, serialized into a plain mapping when written
//! into the host config, and never mutated afterward. Updates replace the
//! serialized values, not the schema.

use crate::config::{ConfigDiagnostics, ConfigError, FieldPath};
use std::collections::BTreeSet;
use toml::{Table, Value};

// ============================================================================
// Constraint
// ============================================================================

/// Value constraint attached to a schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Any value of the default's kind.
    Any,
    /// Integer within an inclusive range.
    IntRange { min: i64, max: i64 },
    /// String drawn from a fixed set.
    OneOf(Vec<String>),
}

// ============================================================================
// FieldSpec
// ============================================================================

/// One named, typed, bounded field of a tool's settings schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    description: String,
    default: Value,
    constraint: Constraint,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: default.into(),
            constraint: Constraint::Any,
        }
    }

    /// Constrain to an inclusive integer range.
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.constraint = Constraint::IntRange { min, max };
        self
    }

    /// Constrain to an enumerated set of string values.
    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint = Constraint::OneOf(allowed.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Check one value against this field's constraint.
    fn check(&self, value: &Value, path_prefix: &str, diag: &mut ConfigDiagnostics) {
        let path = FieldPath::new(format!("{path_prefix}.{}", self.name));
        match &self.constraint {
            Constraint::Any => {}
            Constraint::IntRange { min, max } => match value.as_integer() {
                Some(n) if (*min..=*max).contains(&n) => {}
                Some(n) => diag.error(path, format!("value {n} out of range {min}..={max}")),
                None => diag.error(path, "expected an integer"),
            },
            Constraint::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => {}
                Some(s) => diag.error_with_hint(
                    path,
                    format!("'{s}' is not an allowed value"),
                    format!("allowed: {}", allowed.join(", ")),
                ),
                None => diag.error(path, "expected a string"),
            },
        }
    }
}

// ============================================================================
// SettingsModel
// ============================================================================

/// A tool's validated settings schema.
#[derive(Debug, Clone)]
pub struct SettingsModel {
    fields: Vec<FieldSpec>,
}

impl SettingsModel {
    /// Build a schema, validating every declared default against its own
    /// constraint and rejecting duplicate field names.
    ///
    /// Failing here is a programming-time invariant: defaults are authored
    /// by the tool, not supplied by users at runtime.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        let mut seen = BTreeSet::new();

        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                diag.error(
                    FieldPath::new(format!("schema.{}", field.name)),
                    "duplicate field name",
                );
            }
            field.check(&field.default, "schema", &mut diag);
        }

        diag.into_result().map_err(ConfigError::Diagnostics)?;
        Ok(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Serialize the schema defaults into a plain mapping.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for field in &self.fields {
            table.insert(field.name.clone(), field.default.clone());
        }
        table
    }

    /// Validate a tool section's current values against the schema.
    ///
    /// Unknown keys are allowed; tools may stash extra keys in their own
    /// section and the schema only governs the fields it declares.
    pub fn validate_table(&self, section: &Table, tool: &str) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        for (key, value) in section {
            if let Some(field) = self.field(key) {
                field.check(value, tool, &mut diag);
            }
        }
        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// ToolSpec
// ============================================================================

/// One tool's identity: its fixed name and settings schema.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    name: String,
    settings: SettingsModel,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, settings: SettingsModel) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("quality", "Default quality level for processing", 80i64)
                .with_range(0, 100),
            FieldSpec::new("format", "Default output format", "webp")
                .one_of(["webp", "avif", "png"]),
            FieldSpec::new("temp_dir", "Directory for temporary files", "./temp"),
            FieldSpec::new("log_level", "Logging level for the tool", "INFO"),
        ]
    }

    #[test]
    fn test_defaults_serialize_to_mapping() {
        let model = SettingsModel::new(demo_fields()).unwrap();
        let table = model.to_table();

        assert_eq!(table["quality"], Value::Integer(80));
        assert_eq!(table["format"], Value::String("webp".into()));
        assert_eq!(table["log_level"], Value::String("INFO".into()));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_out_of_range_default_rejected() {
        let result = SettingsModel::new(vec![
            FieldSpec::new("quality", "quality", 180i64).with_range(0, 100),
        ]);
        assert!(matches!(result, Err(ConfigError::Diagnostics(_))));
    }

    #[test]
    fn test_enum_violating_default_rejected() {
        let result = SettingsModel::new(vec![
            FieldSpec::new("format", "format", "bmp").one_of(["webp", "avif"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_field_name_rejected() {
        let result = SettingsModel::new(vec![
            FieldSpec::new("quality", "first", 1i64),
            FieldSpec::new("quality", "second", 2i64),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_table_flags_bad_values() {
        let model = SettingsModel::new(demo_fields()).unwrap();

        let mut section = model.to_table();
        section.insert("quality".into(), Value::Integer(101));
        section.insert("format".into(), Value::String("bmp".into()));

        let err = model.validate_table(&section, "mediatool").unwrap_err();
        match err {
            ConfigError::Diagnostics(diag) => assert_eq!(diag.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_table_allows_unknown_keys() {
        let model = SettingsModel::new(demo_fields()).unwrap();

        let mut section = model.to_table();
        section.insert("extra".into(), Value::Boolean(true));

        assert!(model.validate_table(&section, "mediatool").is_ok());
    }

    #[test]
    fn test_wrong_type_flagged() {
        let model = SettingsModel::new(demo_fields()).unwrap();

        let mut section = Table::new();
        section.insert("quality".into(), Value::String("high".into()));

        assert!(model.validate_table(&section, "mediatool").is_err());
    }
}
