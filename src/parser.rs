//! Format parsers keyed by file extension.
//!
//! A [`Parser`] is a plain function from file text to a `toml::Table`. The
//! [`ParserRegistry`] maps lowercase extensions to parsers; the loader looks
//! the file's extension up here before reading any values.

use std::collections::BTreeMap;

use toml::Table;

/// Parse function signature. The error string is wrapped into
/// [`SchemafigError::ParseError`](crate::SchemafigError::ParseError) with the file path.
pub type ParseFn = fn(&str) -> Result<Table, String>;

/// Associates a file extension with a parse function.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    pub extension: &'static str,
    pub parse: ParseFn,
}

impl Parser {
    pub fn new(extension: &'static str, parse: ParseFn) -> Self {
        Self { extension, parse }
    }

    pub fn toml() -> Self {
        Self::new("toml", parse_toml)
    }

    pub fn json() -> Self {
        Self::new("json", parse_json)
    }
}

fn parse_toml(content: &str) -> Result<Table, String> {
    content.parse::<Table>().map_err(|e| e.to_string())
}

fn parse_json(content: &str) -> Result<Table, String> {
    serde_json::from_str::<Table>(content).map_err(|e| e.to_string())
}

#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, ParseFn>,
}

impl ParserRegistry {
    /// A registry with no parsers at all.
    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
        }
    }

    /// Register a parser. A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, parser: Parser) {
        self.parsers
            .insert(parser.extension.to_ascii_lowercase(), parser.parse);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, extension: &str) -> Option<ParseFn> {
        self.parsers.get(&extension.to_ascii_lowercase()).copied()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }
}

impl Default for ParserRegistry {
    /// TOML only.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Parser::toml());
        registry
    }
}
