use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub environment: String,
}

/// Placeholder bearer-token check settings. Not a security boundary.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub min_token_length: usize,
    pub token_prefixes: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(File::with_name("config/local").required(false))
            // Eg.. `TRANSIT__SERVER__PORT=9000` sets `server.port`
            .add_source(
                Environment::with_prefix("TRANSIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.token_prefixes")
                    .try_parsing(true),
            )
            // Plain PORT wins, as most hosting platforms inject it
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        s.try_deserialize()
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("app.environment", "development")?
            .set_default("auth.min_token_length", 10_i64)?
            .set_default("auth.token_prefixes", vec!["host-token", "mock-token"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_sources() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.auth.min_token_length, 10);
        assert_eq!(config.auth.token_prefixes, vec!["host-token", "mock-token"]);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9090

            [app]
            environment = "production"

            [auth]
            token_prefixes = ["partner-token"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.token_prefixes, vec!["partner-token"]);
        assert_eq!(config.app.environment, "production");
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        let result = Config::from_toml("[server]\nport = \"eighty\"\n");
        assert!(result.is_err());
    }
}
