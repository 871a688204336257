//! Generic configuration mapping returned by raw loads.

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

/// A parsed config file: string keys mapped to TOML values, possibly nested.
///
/// This is the untyped view. Nothing is dropped or checked beyond what the
/// format parser itself enforces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Table);

impl ConfigDocument {
    pub fn new(table: Table) -> Self {
        Self(table)
    }

    /// Look up a value by dotted path (e.g. `"metrics.gql.port"`).
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        table_get(&self.0, dotted_key)
    }

    pub fn contains(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        table_to_json(&self.0)
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_json())
    }
}

impl From<Table> for ConfigDocument {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"database.url"`).
pub(crate) fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

pub(crate) fn table_to_json(table: &Table) -> serde_json::Value {
    serde_json::Value::Object(
        table
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

/// Convert a TOML value to JSON. Datetimes become their RFC 3339 string;
/// non-finite floats become `null`.
pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Table(t) => table_to_json(t),
    }
}

/// Format a TOML value for display.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(_) | Value::Table(_) => value_to_json(value).to_string(),
    }
}
