use serde::Deserialize;

use crate::domain::cache::{KeyHashWidth, DEFAULT_NAMESPACE};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub telemetry: TelemetrySettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Search result cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `in_memory`, `postgres` or `redis`
    pub backend: String,
    pub ttl_minutes: u64,
    pub namespace: String,
    pub key_width: KeyHashWidth,
    /// Entry bound for the in-memory backend
    pub max_capacity: u64,
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

/// Query telemetry settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    /// `in_memory` or `postgres`
    pub backend: String,
    /// Record bound for the in-memory backend
    pub max_records: usize,
}

/// PostgreSQL connection settings, used by the postgres backends
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            ttl_minutes: 30,
            namespace: DEFAULT_NAMESPACE.to_string(),
            key_width: KeyHashWidth::default(),
            max_capacity: 10_000,
            redis_url: None,
            key_prefix: "decision-search".to_string(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "in_memory".to_string(),
            max_records: 100_000,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Whether any configured backend needs a database connection
    pub fn requires_database(&self) -> bool {
        let is_postgres = |backend: &str| matches!(backend, "postgres" | "postgresql");

        is_postgres(&self.cache.backend.to_lowercase())
            || (self.telemetry.enabled && is_postgres(&self.telemetry.backend.to_lowercase()))
    }
}
