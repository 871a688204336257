use toml::{Table, Value};

use crate::error::SchemafigError;
use crate::overrides::set_nested;
use crate::schema::Schema;
use crate::types::Format;

/// Build a `toml::Table` from the environment variables bound to schema fields.
///
/// Only variables named by a field's `env` binding are read; everything else in
/// `vars` is ignored. Values stay raw strings here; [`coerce_env_value`] turns
/// them into typed values during resolution, once the winning source is known.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_to_table(
    schema: &Schema,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Table, SchemafigError> {
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let mut table = Table::new();

    for field in schema.fields() {
        let Some(var) = field.env_var() else {
            continue;
        };
        // Last occurrence wins, matching how a shell would export duplicates.
        if let Some((_, value)) = vars.iter().rev().find(|(k, _)| k == var) {
            tracing::debug!(key = field.key(), var, "env override present");
            set_nested(&mut table, field.key(), Value::String(value.clone()))?;
        }
    }

    Ok(table)
}

/// Coerce a raw env string according to the field's format.
///
/// The result still goes through [`check_value`](crate::validate::check_value),
/// so coercion only has to produce the right *kind* of value.
pub fn coerce_env_value(
    key: &str,
    var: &str,
    format: Format,
    raw: &str,
) -> Result<Value, SchemafigError> {
    let invalid = |what: &str| SchemafigError::InvalidValue {
        key: key.to_string(),
        reason: format!("env var {var}={raw:?} is not {what}"),
    };

    match format {
        Format::String => Ok(Value::String(raw.to_string())),
        Format::Number => {
            let trimmed = raw.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(invalid("a number")),
            }
        }
        Format::Integer | Format::Nat | Format::Port => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid("an integer")),
        Format::Boolean => parse_bool(raw.trim())
            .map(Value::Boolean)
            .ok_or_else(|| invalid("a boolean")),
        Format::Array => Ok(Value::Array(
            raw.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        Format::Object => serde_json::from_str::<Table>(raw)
            .map(Value::Table)
            .map_err(|_| invalid("a JSON object")),
        Format::Any => Ok(parse_env_value(raw)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse an env var value into a typed TOML value.
/// Tries: bool → integer → float → string.
fn parse_env_value(s: &str) -> Value {
    if let Some(b) = parse_bool(s) {
        return Value::Boolean(b);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        // Only use float if the string actually contains a dot,
        // to avoid "NaN" / "inf" being parsed as float.
        if s.contains('.') {
            return Value::Float(f);
        }
    }
    Value::String(s.to_string())
}
