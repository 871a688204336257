use std::path::{Path, PathBuf};

use confique::Config;
use serde::Deserialize;

use crate::document::{ConfigDocument, table_get};
use crate::error::SchemafigError;
use crate::file;
use crate::overrides::set_nested;
use crate::parser::{Parser, ParserRegistry};
use crate::resolve::{self, ResolveInput};
use crate::resolved::ResolvedConfig;
use crate::schema::Schema;
use crate::types::Source;

/// Loads config files as raw documents or through a [`Schema`].
///
/// The loader holds options only. Every call re-reads the file and the
/// environment, so two calls never share state.
///
/// ```ignore
/// let loader = ConfigLoader::new();
/// let raw = loader.load_raw_config("environments/local.toml")?;
/// let config = loader.load_schema_config("environments/local.toml", &schema)?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    parsers: ParserRegistry,
    env_vars: Option<Vec<(String, String)>>,
    env_enabled: bool,
    strict: bool,
    overrides: Vec<(String, toml::Value)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader with the TOML parser registered, reading the process environment.
    pub fn new() -> Self {
        Self {
            parsers: ParserRegistry::default(),
            env_vars: None,
            env_enabled: true,
            strict: false,
            overrides: Vec::new(),
        }
    }

    /// Associate a file extension with a parse function.
    pub fn register_parser(mut self, parser: Parser) -> Self {
        self.parsers.register(parser);
        self
    }

    /// Read env bindings from `vars` instead of the process environment.
    pub fn env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, keys a file or override sets but the schema does not
    /// declare produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add an override above every other source. `None` values are ignored.
    pub fn set_override<V: Into<toml::Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push((key.to_string(), v.into()));
        }
        self
    }

    /// Parse a file into an untyped document, exactly as written.
    pub fn load_raw_config(&self, path: impl AsRef<Path>) -> Result<ConfigDocument, SchemafigError> {
        let parsed = file::load_file(path.as_ref(), &self.parsers)?;
        Ok(ConfigDocument::new(parsed.table))
    }

    /// Load a file through `schema`: defaults, then file values, then bound
    /// env vars, then overrides.
    pub fn load_schema_config(
        &self,
        path: impl AsRef<Path>,
        schema: &Schema,
    ) -> Result<ResolvedConfig, SchemafigError> {
        self.load_schema_config_files(&[path.as_ref().to_path_buf()], schema)
    }

    /// Like [`load_schema_config`](Self::load_schema_config) over several files;
    /// later files override earlier ones. Every file must exist.
    pub fn load_schema_config_files(
        &self,
        paths: &[PathBuf],
        schema: &Schema,
    ) -> Result<ResolvedConfig, SchemafigError> {
        let input = self.build_input(paths)?;
        resolve::resolve(schema, input)
    }

    /// Load into a confique config struct.
    ///
    /// The schema is derived from `C::META`, so `#[config(env = ...)]` bindings
    /// apply. Confique fills struct defaults after resolution.
    ///
    /// Derived fields carry no format, so env values are first coerced by
    /// guessing. A guessed value the struct field cannot take (`METRICS_HOST=12345`
    /// for a `String`) falls back to the variable's raw text.
    pub fn load_typed<C: Config>(&self, path: impl AsRef<Path>) -> Result<C, SchemafigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let schema = Schema::from_meta(&C::META)?;
        let input = self.build_input(&[path.as_ref().to_path_buf()])?;
        let env_vars = input.env_vars.clone();
        let resolved = resolve::resolve(&schema, input)?;

        let from_env: Vec<(String, String)> = schema
            .fields()
            .iter()
            .filter_map(|field| {
                let Some(Source::Env(var)) = resolved.origin(field.key()) else {
                    return None;
                };
                let (_, raw) = env_vars.iter().rev().find(|(k, _)| k == var)?;
                Some((field.key().to_string(), raw.clone()))
            })
            .collect();

        let mut table = resolved.into_table();
        for (key, raw) in from_env {
            let guessed = table_get(&table, &key).cloned();
            let raw = toml::Value::String(raw);
            if guessed.is_some_and(|v| !leaf_fits::<C>(&key, v))
                && leaf_fits::<C>(&key, raw.clone())
            {
                tracing::debug!(key = %key, "keeping env value as a string");
                set_nested(&mut table, &key, raw)?;
            }
        }

        let layer: C::Layer = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| SchemafigError::InvalidValue {
                key: "<resolved>".into(),
                reason: e.to_string(),
            })?;

        C::builder()
            .preloaded(layer)
            .load()
            .map_err(SchemafigError::from)
    }

    fn build_input(&self, paths: &[PathBuf]) -> Result<ResolveInput, SchemafigError> {
        let files = file::load_files(paths, &self.parsers)?;
        let env_vars = match &self.env_vars {
            Some(vars) => vars.clone(),
            None if self.env_enabled => std::env::vars().collect(),
            None => Vec::new(),
        };

        Ok(ResolveInput {
            files,
            env_vars,
            env_enabled: self.env_enabled,
            overrides: self.overrides.clone(),
            strict: self.strict,
        })
    }
}

/// True if `C::Layer` accepts `value` at `key` on its own.
fn leaf_fits<C: Config>(key: &str, value: toml::Value) -> bool
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut single = toml::Table::new();
    if set_nested(&mut single, key, value).is_err() {
        return false;
    }
    let layer: Result<C::Layer, _> = toml::Value::Table(single).try_into();
    layer.is_ok()
}
