//! Path resolution, existence checks and parsing of config files.
//!
//! Every load goes through the same three steps:
//!
//! 1. [`resolve_path`] turns a relative path into an absolute one (against the
//!    current working directory). Errors always carry this absolute path.
//! 2. [`ensure_exists`] fails with [`SchemafigError::NotFound`] when nothing is
//!    there. Unlike a search path, an explicitly named file is a requirement.
//! 3. [`load_file`] reads the full text and hands it to the parser registered
//!    for the file's extension.

use std::path::{Path, PathBuf};

use toml::Table;

use crate::error::SchemafigError;
use crate::parser::ParserRegistry;

/// A config file that was read and parsed. The source text is kept for
/// line-number lookups in strict mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub content: String,
    pub table: Table,
}

/// Make `path` absolute without touching the filesystem.
pub fn resolve_path(path: &Path) -> Result<PathBuf, SchemafigError> {
    std::path::absolute(path).map_err(|e| SchemafigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Fail with `NotFound` if nothing exists at `path`.
pub fn ensure_exists(path: &Path) -> Result<(), SchemafigError> {
    match path.try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(SchemafigError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SchemafigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolve, check, read and parse a single config file.
pub fn load_file(path: &Path, parsers: &ParserRegistry) -> Result<ParsedFile, SchemafigError> {
    let path = resolve_path(path)?;
    ensure_exists(&path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let parse = parsers
        .get(&extension)
        .ok_or_else(|| SchemafigError::UnsupportedFormat {
            extension,
            path: path.clone(),
        })?;

    let content = std::fs::read_to_string(&path).map_err(|e| SchemafigError::IoError {
        path: path.clone(),
        source: e,
    })?;

    let table = parse(&content).map_err(|reason| SchemafigError::ParseError {
        path: path.clone(),
        reason,
    })?;

    tracing::debug!(path = %path.display(), keys = table.len(), "loaded config file");

    Ok(ParsedFile {
        path,
        content,
        table,
    })
}

/// Load several files in order. The first missing or unparsable file aborts the load.
pub fn load_files(
    paths: &[PathBuf],
    parsers: &ParserRegistry,
) -> Result<Vec<ParsedFile>, SchemafigError> {
    paths.iter().map(|p| load_file(p, parsers)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::test::SAMPLE_TOML;
    use crate::parser::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_path(Path::new("environments/local.toml")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("environments/local.toml"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("app.toml");
        assert_eq!(resolve_path(&p).unwrap(), p);
    }

    #[test]
    fn load_existing_toml() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("local.toml");
        fs::write(&p, SAMPLE_TOML).unwrap();

        let file = load_file(&p, &ParserRegistry::default()).unwrap();
        assert_eq!(file.path, p);
        assert_eq!(file.content, SAMPLE_TOML);
        assert_eq!(file.table["metrics"]["port"].as_integer(), Some(9000));
    }

    #[test]
    fn missing_file_is_not_found_with_absolute_path() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("missing.toml");

        let err = load_file(&p, &ParserRegistry::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains(&p.display().to_string()));
    }

    #[test]
    fn unregistered_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("app.yaml");
        fs::write(&p, "metrics: {}\n").unwrap();

        let err = load_file(&p, &ParserRegistry::default()).unwrap_err();
        match err {
            SchemafigError::UnsupportedFormat { extension, .. } => assert_eq!(extension, "yaml"),
            other => panic!("Expected UnsupportedFormat, got: {other:?}"),
        }
    }

    #[test]
    fn registered_extension_is_used() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("app.json");
        fs::write(&p, r#"{"metrics": {"port": 1}}"#).unwrap();

        let mut parsers = ParserRegistry::default();
        parsers.register(Parser::json());
        let file = load_file(&p, &parsers).unwrap();
        assert_eq!(file.table["metrics"]["port"].as_integer(), Some(1));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("bad.toml");
        fs::write(&p, "[metrics\nport = ").unwrap();

        let err = load_file(&p, &ParserRegistry::default()).unwrap_err();
        assert!(matches!(err, SchemafigError::ParseError { .. }));
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("conf.toml");
        fs::create_dir(&p).unwrap();

        let err = load_file(&p, &ParserRegistry::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn load_files_stops_at_first_missing() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("a.toml");
        fs::write(&present, "port = 1\n").unwrap();
        let missing = dir.path().join("b.toml");

        let err = load_files(&[present, missing.clone()], &ParserRegistry::default()).unwrap_err();
        match err {
            SchemafigError::NotFound { path } => assert_eq!(path, missing),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }
}
