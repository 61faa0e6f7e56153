use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use chrono::Duration;
use planbook_core::recurrence::ExpansionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "planbook.toml";

/// Upper bound for `auth.token_ttl_days` (ten years)
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Figment(#[from] figment::Error),
    #[error("auth.jwt_secret is not set; add it to the config file or set PLANBOOK_AUTH__JWT_SECRET")]
    MissingJwtSecret,
    #[error("auth.token_ttl_days must be between 1 and {max}, got {value}")]
    InvalidTokenTtl { value: i64, max: i64 },
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub recurrence: RecurrenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, as handed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite file; created on first start
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "planbook.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. No default: the server refuses to start without one.
    pub jwt_secret: Option<String>,
    pub token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_days: 7,
        }
    }
}

impl AuthConfig {
    pub fn secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)
    }

    /// Token lifetime, bounded so expiry timestamps stay representable
    pub fn token_ttl(&self) -> Result<Duration, ConfigError> {
        let days = self.token_ttl_days;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
            return Err(ConfigError::InvalidTokenTtl {
                value: days,
                max: MAX_TOKEN_TTL_DAYS,
            });
        }
        Ok(Duration::days(days))
    }
}

/// Limits for recurring event expansion
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RecurrenceConfig {
    pub max_occurrences: usize,
    pub max_batch_size: usize,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        let defaults = ExpansionConfig::default();
        Self {
            max_occurrences: defaults.max_occurrences,
            max_batch_size: defaults.max_batch_size,
        }
    }
}

impl From<&RecurrenceConfig> for ExpansionConfig {
    fn from(config: &RecurrenceConfig) -> Self {
        ExpansionConfig {
            max_occurrences: config.max_occurrences,
            max_batch_size: config.max_batch_size,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file at `path` (if it exists), then `PLANBOOK_*`
    /// environment variables, with `__` separating nested keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PLANBOOK_").split("__"))
    }
}
