#[cfg(test)]
pub mod test {
    use confique::Config;
    use serde::{Deserialize, Serialize};

    use crate::schema::{FieldSpec, Schema};
    use crate::types::Format;

    /// The sample environment file: declared metrics fields plus an
    /// undeclared `[metrics.gql]` table.
    pub const SAMPLE_TOML: &str = "[metrics]
host = \"127.0.0.1\"
port = 9000

[metrics.gql]
port = 9001
";

    /// `metrics.host` (string) and `metrics.port` (number), both required
    /// and both bound to env vars.
    pub fn metrics_schema() -> Schema {
        Schema::builder()
            .field(
                FieldSpec::new("metrics.host")
                    .env("METRICS_HOST")
                    .format(Format::String),
            )
            .field(
                FieldSpec::new("metrics.port")
                    .env("METRICS_PORT")
                    .format(Format::Number),
            )
            .build()
            .unwrap()
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct AppConfig {
        /// Metrics endpoint settings.
        #[config(nested)]
        pub metrics: MetricsConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct MetricsConfig {
        /// Host the metrics endpoint binds to.
        #[config(env = "METRICS_HOST")]
        pub host: String,

        /// Port the metrics endpoint listens on.
        #[config(env = "METRICS_PORT", default = 9000)]
        pub port: u16,

        /// Free-form label attached to exported metrics.
        pub label: Option<String>,
    }

    #[test]
    fn sample_parses() {
        let table: toml::Table = SAMPLE_TOML.parse().unwrap();
        assert_eq!(table["metrics"]["gql"]["port"].as_integer(), Some(9001));
    }

    #[test]
    fn app_meta_nests_metrics() {
        let metrics = &AppConfig::META.fields[0];
        assert_eq!(metrics.name, "metrics");
        assert!(matches!(
            metrics.kind,
            confique::meta::FieldKind::Nested { .. }
        ));
    }
}
