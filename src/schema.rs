//! Schema descriptors: which fields exist, where their values may come from,
//! and what shape those values must have.
//!
//! A [`Schema`] is a flat list of [`FieldSpec`]s keyed by dotted path. Nesting
//! is implied by the dots: `metrics.host` lives in the `[metrics]` table of a
//! TOML file. Each field may bind one environment variable and may declare a
//! default. A field with neither a default nor the `optional` flag is
//! required: resolution fails unless some source provides it.
//!
//! ```ignore
//! let schema = Schema::builder()
//!     .field(FieldSpec::new("metrics.host").env("METRICS_HOST").format(Format::String))
//!     .field(FieldSpec::new("metrics.port").env("METRICS_PORT").format(Format::Number))
//!     .build()?;
//! ```
//!
//! Schemas can also be derived from a confique `Config` struct with
//! [`Schema::from_meta`]; `#[config(env = ...)]` becomes the env binding.

use std::collections::HashSet;

use confique::meta::{FieldKind, LeafKind, Meta};
use toml::{Table, Value};

use crate::error::SchemafigError;
use crate::overrides::set_nested;
use crate::types::Format;
use crate::validate;

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    key: String,
    env: Option<String>,
    default: Option<Value>,
    format: Format,
    doc: Option<String>,
    sensitive: bool,
    optional: bool,
}

impl FieldSpec {
    /// A required field of format [`Format::Any`] with no env binding.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            env: None,
            default: None,
            format: Format::Any,
            doc: None,
            sensitive: false,
            optional: false,
        }
    }

    /// Bind an environment variable. When set, it overrides the file value.
    pub fn env(mut self, var: &str) -> Self {
        self.env = Some(var.to_string());
        self
    }

    pub fn default_value<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Mask the value in listings.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Allow the field to stay unset without failing resolution.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn value_format(&self) -> Format {
        self.format
    }

    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// True when resolution must find a value for this field.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }
}

/// A validated set of field specs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Derive a schema from a confique `Meta` tree.
    ///
    /// Every leaf becomes a field of format [`Format::Any`]; the typed struct
    /// does its own type checking on deserialization. Leaves with a confique
    /// default, and `Option` leaves, are not required here: confique fills or
    /// skips them after resolution.
    pub fn from_meta(meta: &Meta) -> Result<Self, SchemafigError> {
        let mut builder = Self::builder();
        collect_fields(meta, "", &mut builder);
        builder.build()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// True if some field lives strictly below `section` (e.g. `metrics` for `metrics.host`).
    pub fn has_section(&self, section: &str) -> bool {
        self.fields.iter().any(|f| is_below(&f.key, section))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All declared defaults as a nested table.
    pub(crate) fn defaults_table(&self) -> Result<Table, SchemafigError> {
        let mut table = Table::new();
        for field in &self.fields {
            if let Some(default) = &field.default {
                set_nested(&mut table, &field.key, default.clone())?;
            }
        }
        Ok(table)
    }
}

fn is_below(key: &str, section: &str) -> bool {
    key.strip_prefix(section)
        .is_some_and(|rest| rest.starts_with('.'))
}

fn collect_fields(meta: &Meta, prefix: &str, builder: &mut SchemaBuilder) {
    for field in meta.fields {
        let dotted = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &field.kind {
            FieldKind::Leaf { env, kind, .. } => {
                let mut spec = FieldSpec::new(&dotted);
                if let Some(var) = env {
                    spec = spec.env(var);
                }
                if !matches!(kind, LeafKind::Required { default: None, .. }) {
                    spec = spec.optional();
                }
                let doc = field.doc.join(" ");
                if !doc.trim().is_empty() {
                    spec = spec.doc(doc.trim());
                }
                builder.fields.push(spec);
            }
            FieldKind::Nested { meta, .. } => {
                collect_fields(meta, &dotted, builder);
            }
        }
    }
}

/// Accumulates field specs; [`build`](Self::build) checks them as a whole.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Check and freeze the schema.
    ///
    /// Rejects empty key segments, duplicate keys, a key that is also the
    /// section of another key (`a` next to `a.b`), and defaults that fail
    /// their own format.
    pub fn build(self) -> Result<Schema, SchemafigError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.key.split('.').any(|segment| segment.trim().is_empty()) {
                return Err(SchemafigError::InvalidSchema(format!(
                    "malformed key '{}'",
                    field.key
                )));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(SchemafigError::InvalidSchema(format!(
                    "duplicate key '{}'",
                    field.key
                )));
            }
            if let Some(var) = &field.env
                && var.is_empty()
            {
                return Err(SchemafigError::InvalidSchema(format!(
                    "empty env var name for '{}'",
                    field.key
                )));
            }
            if let Some(default) = &field.default {
                validate::check_value(&field.key, field.format, default.clone()).map_err(|e| {
                    SchemafigError::InvalidSchema(format!("default does not match format: {e}"))
                })?;
            }
        }

        for field in &self.fields {
            if let Some(other) = self.fields.iter().find(|o| is_below(&o.key, &field.key)) {
                return Err(SchemafigError::InvalidSchema(format!(
                    "'{}' is both a field and the section of '{}'",
                    field.key, other.key
                )));
            }
        }

        Ok(Schema {
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{AppConfig, metrics_schema};
    use confique::Config;

    #[test]
    fn metrics_schema_builds() {
        let schema = metrics_schema();
        assert_eq!(schema.fields().len(), 2);
        let host = schema.field("metrics.host").unwrap();
        assert_eq!(host.env_var(), Some("METRICS_HOST"));
        assert_eq!(host.value_format(), Format::String);
        assert!(host.is_required());
    }

    #[test]
    fn default_makes_field_not_required() {
        let spec = FieldSpec::new("port").default_value(8080);
        assert!(!spec.is_required());
        assert_eq!(spec.default().unwrap().as_integer(), Some(8080));
    }

    #[test]
    fn optional_field_not_required() {
        assert!(!FieldSpec::new("url").optional().is_required());
    }

    #[test]
    fn sections_are_detected() {
        let schema = metrics_schema();
        assert!(schema.has_section("metrics"));
        assert!(!schema.has_section("metrics.host"));
        assert!(!schema.has_section("metric"));
        assert!(!schema.has_section("metrics.gql"));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = Schema::builder()
            .field(FieldSpec::new("port"))
            .field(FieldSpec::new("port"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn malformed_key_rejected() {
        for key in ["", "a..b", ".a", "a."] {
            let result = Schema::builder().field(FieldSpec::new(key)).build();
            assert!(
                matches!(result, Err(SchemafigError::InvalidSchema(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn field_and_section_conflict_rejected() {
        let err = Schema::builder()
            .field(FieldSpec::new("metrics"))
            .field(FieldSpec::new("metrics.port"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("section"));
    }

    #[test]
    fn default_must_match_format() {
        let err = Schema::builder()
            .field(
                FieldSpec::new("port")
                    .format(Format::Number)
                    .default_value("not a number"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemafigError::InvalidSchema(_)));
    }

    #[test]
    fn defaults_table_nests() {
        let schema = Schema::builder()
            .field(FieldSpec::new("metrics.port").default_value(9000))
            .field(FieldSpec::new("metrics.host"))
            .build()
            .unwrap();
        let table = schema.defaults_table().unwrap();
        assert_eq!(table["metrics"]["port"].as_integer(), Some(9000));
        assert!(table["metrics"].get("host").is_none());
    }

    #[test]
    fn from_meta_reads_env_bindings_and_defaults() {
        let schema = Schema::from_meta(&AppConfig::META).unwrap();
        let host = schema.field("metrics.host").unwrap();
        assert_eq!(host.env_var(), Some("METRICS_HOST"));
        assert!(host.is_required());
        assert_eq!(host.documentation(), Some("Host the metrics endpoint binds to."));

        let port = schema.field("metrics.port").unwrap();
        assert_eq!(port.env_var(), Some("METRICS_PORT"));
        assert!(!port.is_required());

        let label = schema.field("metrics.label").unwrap();
        assert_eq!(label.env_var(), None);
        assert!(!label.is_required());
    }
}
