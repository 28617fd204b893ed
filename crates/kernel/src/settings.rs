use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRARY_ENV";
const CONFIG_DIR_ENV: &str = "LIBRARY_CONFIG_DIR";
const ENV_PREFIX: &str = "LIBRARY";

/// Deployment environment the service is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, the base file, the
    /// environment overlay, and `LIBRARY_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // A missing `.env` is fine.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let environment: Environment = environment.parse()?;

        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .with_context(|| "unable to resolve current directory")?,
        };

        let mut settings = Self::load_from(&config_dir, &environment)?;
        settings.environment = environment;
        settings.validate()?;

        Ok(settings)
    }

    fn load_from(config_dir: &std::path::Path, environment: &Environment) -> anyhow::Result<Self> {
        let environment_name = match environment {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };

        let builder = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(
                config::File::from(config_dir.join(format!("{}.toml", environment_name)))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        cfg.try_deserialize()
            .with_context(|| "failed to deserialize configuration")
    }

    /// Reject combinations no single section can check on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        let pagination = &self.pagination;
        if pagination.max_page_size == 0 {
            bail!("pagination.max_page_size must be at least 1");
        }
        if pagination.default_page_size == 0
            || pagination.default_page_size > pagination.max_page_size
        {
            bail!(
                "pagination.default_page_size must be within 1..={}, got {}",
                pagination.max_page_size,
                pagination.default_page_size
            );
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Which record store implementation backs the service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://library.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Bounds applied to paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "PaginationSettings::default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "PaginationSettings::default_max_page_size")]
    pub max_page_size: u32,
}

impl PaginationSettings {
    fn default_page_size() -> u32 {
        10
    }

    fn default_max_page_size() -> u32 {
        100
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_is_local_sqlite_file() {
        let settings = Settings::default();
        assert_eq!(settings.database.backend, StoreBackend::Sqlite);
        assert_eq!(settings.database.url, "sqlite://library.db");
    }

    #[test]
    fn default_pagination_bounds() {
        let settings = Settings::default();
        assert_eq!(settings.pagination.default_page_size, 10);
        assert_eq!(settings.pagination.max_page_size, 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn default_page_size_above_max_is_rejected() {
        let mut settings = Settings::default();
        settings.pagination.default_page_size = 250;
        assert!(settings.validate().is_err());

        settings.pagination.default_page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_config_dir_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("library-kernel-settings-missing");
        let settings = Settings::load_from(&dir, &Environment::Staging).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
    }
}
