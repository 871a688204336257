//! Value checks against declared formats, and strict-mode detection of
//! keys a config file sets but the schema does not declare.

use toml::{Table, Value};

use crate::error::SchemafigError;
use crate::file::ParsedFile;
use crate::schema::Schema;
use crate::types::Format;

/// Check `value` against `format`, returning it unchanged on success.
pub fn check_value(key: &str, format: Format, value: Value) -> Result<Value, SchemafigError> {
    let ok = match (format, &value) {
        (Format::Any, _) => true,
        (Format::String, Value::String(_)) => true,
        (Format::Number, Value::Float(f)) => f.is_finite(),
        (Format::Number, Value::Integer(_)) => true,
        (Format::Integer, Value::Integer(_)) => true,
        (Format::Nat, Value::Integer(i)) => *i >= 0,
        (Format::Port, Value::Integer(i)) => (0..=65535).contains(i),
        (Format::Boolean, Value::Boolean(_)) => true,
        (Format::Array, Value::Array(_)) => true,
        (Format::Object, Value::Table(_)) => true,
        _ => false,
    };

    if ok {
        Ok(value)
    } else {
        Err(SchemafigError::InvalidValue {
            key: key.to_string(),
            reason: mismatch_reason(format, &value),
        })
    }
}

fn mismatch_reason(format: Format, value: &Value) -> String {
    match (format, value) {
        (Format::Nat, Value::Integer(i)) => format!("must be a natural number, got {i}"),
        (Format::Port, Value::Integer(i)) => format!("must be a port (0-65535), got {i}"),
        _ => format!("must be a {format}, got {}", value.type_str()),
    }
}

/// Reject keys in `file` that no schema field accounts for.
///
/// A key is accepted if it is a declared field, or a table that contains
/// declared fields (in which case its children are checked in turn). Every
/// other key is reported with the file path and a best-effort line number.
pub fn validate_unknown_keys(schema: &Schema, file: &ParsedFile) -> Result<(), SchemafigError> {
    let mut unknown_keys = Vec::new();
    collect_unknown(schema, &file.table, "", &mut unknown_keys);

    if unknown_keys.is_empty() {
        return Ok(());
    }

    let errors: Vec<SchemafigError> = unknown_keys
        .into_iter()
        .map(|key| {
            let line = find_key_line(&file.content, &key);
            SchemafigError::UnknownKey {
                key,
                path: file.path.clone(),
                line,
            }
        })
        .collect();

    Err(SchemafigError::UnknownKeys(errors))
}

/// Dotted paths of every key in `table` the schema does not account for.
pub fn unknown_keys(schema: &Schema, table: &Table) -> Vec<String> {
    let mut out = Vec::new();
    collect_unknown(schema, table, "", &mut out);
    out
}

fn collect_unknown(schema: &Schema, table: &Table, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if schema.contains(&dotted) {
            continue;
        }
        match value {
            Value::Table(sub) if schema.has_section(&dotted) => {
                collect_unknown(schema, sub, &dotted, out);
            }
            _ => out.push(dotted),
        }
    }
}

/// Find the 1-indexed line number for a key in TOML content.
///
/// For a dotted key like `"metrics.typo"`, tracks the current `[section]` header
/// while scanning and only matches the leaf key when inside the correct section.
/// A key that names a whole table (`"metrics.gql"`) matches its own header.
///
/// This is a best-effort heuristic: it handles standard `[section]` headers and
/// bare key assignments but does not handle quoted keys or inline tables.
/// Returns 0 if the key cannot be located.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, expected_section)) = segments.split_last() else {
        return 0;
    };

    let mut current_section: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            if current_section.len() == segments.len()
                && segments.iter().zip(&current_section).all(|(a, b)| *a == b)
            {
                return i + 1;
            }
            continue;
        }

        let in_right_section = expected_section.len() == current_section.len()
            && expected_section
                .iter()
                .zip(&current_section)
                .all(|(a, b)| *a == b);

        if in_right_section
            && let Some(after_key) = trimmed.strip_prefix(*leaf)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
