//! Core resolution pipeline: layer all sources and produce the schema view.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Validate each file and override key against the schema (if strict mode)
//! 2. Build layers in ascending precedence: defaults, files (in order),
//!    env vars, overrides
//! 3. For each declared field, take the value from the highest layer that has it
//! 4. Coerce env strings by format, then check every value against its format
//! 5. Collect missing required fields and format errors; fail if any

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::document::table_get;
use crate::env;
use crate::error::SchemafigError;
use crate::file::ParsedFile;
use crate::overrides::{self, set_nested};
use crate::resolved::ResolvedConfig;
use crate::schema::Schema;
use crate::types::Source;
use crate::validate;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
pub struct ResolveInput {
    /// Parsed files in precedence order: first = lowest priority, last = highest.
    pub files: Vec<ParsedFile>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Whether env bindings are honored at all.
    pub env_enabled: bool,
    /// Programmatic overrides as `(dotted_key, value)` pairs.
    pub overrides: Vec<(String, Value)>,
    /// Whether to reject undeclared keys in config files and overrides.
    pub strict: bool,
}

/// Resolve the schema view from pre-loaded inputs.
pub fn resolve(schema: &Schema, input: ResolveInput) -> Result<ResolvedConfig, SchemafigError> {
    let mut layers: Vec<(Source, Table)> = vec![(Source::Default, schema.defaults_table()?)];

    for file in input.files {
        if input.strict {
            validate::validate_unknown_keys(schema, &file)?;
        } else {
            for key in validate::unknown_keys(schema, &file.table) {
                tracing::debug!(key = %key, path = %file.path.display(), "ignoring undeclared key");
            }
        }
        layers.push((Source::File(file.path), file.table));
    }

    let env_table = if input.env_enabled {
        env::env_to_table(schema, input.env_vars)?
    } else {
        Table::new()
    };

    let override_table = overrides::overrides_to_table(&input.overrides)?;

    let mut values = Table::new();
    let mut origins = BTreeMap::new();
    let mut errors = Vec::new();

    for (key, _) in &input.overrides {
        if schema.contains(key) {
            continue;
        }
        if input.strict {
            errors.push(SchemafigError::InvalidValue {
                key: key.clone(),
                reason: "override targets an undeclared key".into(),
            });
        } else {
            tracing::debug!(key = %key, "ignoring override for undeclared key");
        }
    }

    for field in schema.fields() {
        let key = field.key();

        let winner = if let Some(raw) = table_get(&override_table, key) {
            Some((Source::Override, raw.clone()))
        } else if let (Some(var), Some(raw)) = (field.env_var(), table_get(&env_table, key)) {
            let raw = raw.as_str().unwrap_or_default();
            match env::coerce_env_value(key, var, field.value_format(), raw) {
                Ok(v) => Some((Source::Env(var.to_string()), v)),
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            }
        } else {
            layers.iter().rev().find_map(|(source, table)| {
                table_get(table, key).map(|v| (source.clone(), v.clone()))
            })
        };

        let Some((source, value)) = winner else {
            if field.is_required() {
                errors.push(SchemafigError::MissingField {
                    key: key.to_string(),
                });
            }
            continue;
        };

        match validate::check_value(key, field.value_format(), value) {
            Ok(value) => {
                tracing::trace!(key, source = %source, "resolved field");
                set_nested(&mut values, key, value)?;
                origins.insert(key.to_string(), source);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(SchemafigError::SchemaValidation(errors));
    }

    Ok(ResolvedConfig::new(values, origins, schema.clone()))
}
