use std::fmt;
use std::path::PathBuf;

/// Expected shape of a schema field's value.
///
/// Checked against every source (defaults, files, env vars, overrides).
/// Env vars are plain strings, so each format also defines how a raw
/// string is coerced before the check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// A string. Env values are taken verbatim.
    String,
    /// An integer or a float.
    Number,
    /// An integer.
    Integer,
    /// A non-negative integer.
    Nat,
    /// An integer in `0..=65535`.
    Port,
    /// `true` or `false`.
    Boolean,
    /// An array. Env values are split on commas.
    Array,
    /// A table. Env values are parsed as a JSON object.
    Object,
    /// Anything. Env values are parsed heuristically: bool, integer, float, string.
    #[default]
    Any,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::String => "string",
            Format::Number => "number",
            Format::Integer => "integer",
            Format::Nat => "natural number",
            Format::Port => "port",
            Format::Boolean => "boolean",
            Format::Array => "array",
            Format::Object => "table",
            Format::Any => "any",
        };
        f.write_str(name)
    }
}

/// Which layer supplied a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The field's declared default.
    Default,
    /// A config file.
    File(PathBuf),
    /// The named environment variable.
    Env(String),
    /// A programmatic override.
    Override,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::File(path) => write!(f, "file {}", path.display()),
            Source::Env(var) => write!(f, "env {var}"),
            Source::Override => write!(f, "override"),
        }
    }
}
