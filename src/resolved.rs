//! The schema view handed back by a schema load.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::document::{ConfigDocument, format_value, table_get, table_to_json};
use crate::error::SchemafigError;
use crate::schema::Schema;
use crate::types::Source;

const MASK: &str = "[Sensitive]";

/// Resolved values for the fields a schema declares, and where each came from.
///
/// Only declared fields that resolved to a value are present. Lookups take
/// dotted paths; a section path (`"metrics"`) returns the whole sub-table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    values: Table,
    origins: BTreeMap<String, Source>,
    schema: Schema,
}

impl ResolvedConfig {
    pub(crate) fn new(values: Table, origins: BTreeMap<String, Source>, schema: Schema) -> Self {
        Self {
            values,
            origins,
            schema,
        }
    }

    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        table_get(&self.values, dotted_key)
    }

    pub fn has(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    /// Deserialize the value at `dotted_key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, dotted_key: &str) -> Result<T, SchemafigError> {
        let value = self
            .get(dotted_key)
            .ok_or_else(|| SchemafigError::MissingField {
                key: dotted_key.to_string(),
            })?;
        value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| SchemafigError::InvalidValue {
                key: dotted_key.to_string(),
                reason: e.to_string(),
            })
    }

    /// The layer that supplied a field's value. Only leaf fields have an origin.
    pub fn origin(&self, dotted_key: &str) -> Option<&Source> {
        self.origins.get(dotted_key)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolved fields as `(dotted_key, display_value)`, in schema order.
    /// Sensitive fields are masked.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.schema
            .fields()
            .iter()
            .filter_map(|field| {
                let value = self.get(field.key())?;
                let display = if field.is_sensitive() {
                    MASK.to_string()
                } else {
                    format_value(value)
                };
                Some((field.key().to_string(), display))
            })
            .collect()
    }

    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument::new(self.values.clone())
    }

    pub fn into_table(self) -> Table {
        self.values
    }

    /// Pretty-printed JSON of the resolved values (unmasked).
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", table_to_json(&self.values))
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}
