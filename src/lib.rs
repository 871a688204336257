//! Schema-driven configuration: load a TOML file, overlay environment
//! variables, and get back only the fields you declared.
//!
//! Schemafig exposes two views of the same config file through
//! [`ConfigLoader`]:
//!
//! ```ignore
//! let loader = ConfigLoader::new();
//!
//! // Everything in the file, exactly as written.
//! let raw = loader.load_raw_config("environments/local.toml")?;
//!
//! // Only declared fields, with env overrides applied.
//! let schema = Schema::builder()
//!     .field(FieldSpec::new("metrics.host").env("METRICS_HOST").format(Format::String))
//!     .field(FieldSpec::new("metrics.port").env("METRICS_PORT").format(Format::Number))
//!     .build()?;
//! let config = loader.load_schema_config("environments/local.toml", &schema)?;
//! let port: u16 = config.get_as("metrics.port")?;
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Schema defaults       FieldSpec::default_value
//!        ↑ overridden by
//! Config files          in the order given, later files win
//!        ↑ overridden by
//! Environment vars      FieldSpec::env, one variable per field
//!        ↑ overridden by
//! Overrides             ConfigLoader::set_override
//! ```
//!
//! Layers are sparse: a file only needs the keys it changes, and an env var
//! targets exactly one field. A field with no default that no layer supplies
//! is an error, as is a value that fails the field's [`Format`]. All such
//! problems are reported together in [`SchemafigError::SchemaValidation`].
//!
//! # Environment variables
//!
//! Bindings are explicit. A field declared with `.env("METRICS_PORT")` reads
//! that exact variable; nothing else in the environment is consulted. Env
//! values are strings, so they are coerced by the field's format first:
//! `METRICS_PORT=2001` on a [`Format::Number`] field resolves to the integer
//! `2001`, not the string `"2001"`.
//!
//! # Undeclared keys
//!
//! Keys a file sets but the schema does not declare are dropped from the
//! schema view (they remain in the raw view). Turn on
//! [`strict`](ConfigLoader::strict) to reject them instead, with the file
//! path and line number of each.
//!
//! # File formats
//!
//! Files are parsed by the [`Parser`] registered for their extension. TOML is
//! registered by default; [`Parser::json`] is available to register, and any
//! `fn(&str) -> Result<toml::Table, String>` can be added.
//!
//! # Typed configs
//!
//! [`ConfigLoader::load_typed`] derives the schema from a confique `Config`
//! struct, so `#[config(env = "...")]` and `#[config(default = ...)]` drive
//! the same pipeline and the result is the typed struct.
//!
//! # Error handling
//!
//! All fallible operations return [`SchemafigError`].
//! [`SchemafigError::kind`] sorts errors into not-found, invalid and I/O.

pub mod error;
pub mod types;

mod document;
mod env;
mod file;
mod loader;
mod overrides;
mod parser;
mod resolve;
mod resolved;
mod schema;
mod validate;

#[cfg(test)]
mod fixtures;

pub use document::ConfigDocument;
pub use error::{ErrorKind, SchemafigError};
pub use loader::ConfigLoader;
pub use parser::{ParseFn, Parser, ParserRegistry};
pub use resolved::ResolvedConfig;
pub use schema::{FieldSpec, Schema, SchemaBuilder};
pub use types::{Format, Source};
