//! # schemafig example
//!
//! Loads one TOML file twice: once raw, once through a two-field schema with
//! environment overrides, and prints both as JSON.
//!
//! ```sh
//! cargo run
//! METRICS_PORT=2001 cargo run
//! RUST_LOG=schemafig=debug cargo run -- path/to/other.toml
//! ```
//!
//! Errors are reported on stderr; the process still exits normally.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use schemafig::{ConfigLoader, FieldSpec, Format, Schema, SchemafigError};

/// Print a config file raw and through the metrics schema.
#[derive(Parser, Debug)]
#[command(name = "schemafig-example")]
struct Cli {
    /// Config file to load.
    #[arg(default_value = "environments/local.toml")]
    file: PathBuf,
}

fn metrics_schema() -> Result<Schema, SchemafigError> {
    Schema::builder()
        .field(
            FieldSpec::new("metrics.host")
                .env("METRICS_HOST")
                .format(Format::String)
                .doc("Host the metrics endpoint binds to."),
        )
        .field(
            FieldSpec::new("metrics.port")
                .env("METRICS_PORT")
                .format(Format::Number)
                .doc("Port the metrics endpoint listens on."),
        )
        .build()
}

fn run(path: &Path) -> Result<(), SchemafigError> {
    let loader = ConfigLoader::new();

    let raw = loader.load_raw_config(path)?;
    let schema = metrics_schema()?;
    let config = loader.load_schema_config(path, &schema)?;

    println!("toml config {}", raw.to_json_pretty());
    println!("schema config {}", config.to_json_pretty());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli.file) {
        tracing::debug!(kind = ?e.kind(), "config load failed");
        eprintln!("Error: {e}");
    }
}
