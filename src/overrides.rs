//! Convert dotted-key overrides into a nested `toml::Table`.
//!
//! Each `("metrics.port", Value)` pair is expanded into the nested table
//! structure the resolver reads layers from.

use toml::{Table, Value};

use crate::error::SchemafigError;

/// Convert dotted-key overrides into a nested `toml::Table`.
///
/// `("metrics.host", Value::String("0.0.0.0"))` becomes `{metrics = {host = "0.0.0.0"}}`
///
/// If multiple entries target the same key, the last one wins.
pub fn overrides_to_table(entries: &[(String, Value)]) -> Result<Table, SchemafigError> {
    let mut table = Table::new();
    for (dotted_key, value) in entries {
        set_nested(&mut table, dotted_key, value.clone())?;
    }
    Ok(table)
}

/// Insert `value` at a dotted path, creating intermediate tables.
///
/// Fails if an intermediate segment already holds a non-table value.
pub(crate) fn set_nested(
    table: &mut Table,
    dotted_key: &str,
    value: Value,
) -> Result<(), SchemafigError> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return Ok(());
    };
    let mut current = table;

    for segment in parents {
        current = current
            .entry(*segment)
            .or_insert_with(|| Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| SchemafigError::InvalidValue {
                key: dotted_key.to_string(),
                reason: format!("'{segment}' is not a table"),
            })?;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn flat_key() {
        let table =
            overrides_to_table(&entries(&[("host", Value::String("0.0.0.0".into()))])).unwrap();
        assert_eq!(table["host"].as_str().unwrap(), "0.0.0.0");
    }

    #[test]
    fn nested_key() {
        let table =
            overrides_to_table(&entries(&[("metrics.port", Value::Integer(2001))])).unwrap();
        let metrics = table["metrics"].as_table().unwrap();
        assert_eq!(metrics["port"].as_integer().unwrap(), 2001);
    }

    #[test]
    fn deep_nesting() {
        let table = overrides_to_table(&entries(&[("a.b.c.d", Value::Integer(42))])).unwrap();
        assert_eq!(table["a"]["b"]["c"]["d"].as_integer().unwrap(), 42);
    }

    #[test]
    fn siblings_share_parent() {
        let table = overrides_to_table(&entries(&[
            ("metrics.host", Value::String("x".into())),
            ("metrics.port", Value::Integer(1)),
        ]))
        .unwrap();
        let metrics = table["metrics"].as_table().unwrap();
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn empty_list_empty_table() {
        let table = overrides_to_table(&[]).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn last_entry_wins_for_same_key() {
        let table = overrides_to_table(&entries(&[
            ("port", Value::Integer(3000)),
            ("port", Value::Integer(5000)),
        ]))
        .unwrap();
        assert_eq!(table["port"].as_integer().unwrap(), 5000);
    }

    #[test]
    fn scalar_parent_is_an_error() {
        let err = overrides_to_table(&entries(&[
            ("metrics", Value::Integer(1)),
            ("metrics.port", Value::Integer(2)),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("not a table"));
    }
}
