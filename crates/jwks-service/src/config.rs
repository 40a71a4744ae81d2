use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default SQLite database file, created on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://totally_not_my_privateKeys.db";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const MAX_DB_MAX_CONNECTIONS: u32 = 64;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_URL".to_string(),
                reason: "expected a sqlite: URL".to_string(),
            });
        }

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let db_max_connections = match vars.get("DB_MAX_CONNECTIONS") {
            Some(value) => {
                let parsed = value.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    name: "DB_MAX_CONNECTIONS".to_string(),
                    reason: e.to_string(),
                })?;
                if !(1..=MAX_DB_MAX_CONNECTIONS).contains(&parsed) {
                    return Err(ConfigError::InvalidValue {
                        name: "DB_MAX_CONNECTIONS".to_string(),
                        reason: format!("must be 1-{}, got {}", MAX_DB_MAX_CONNECTIONS, parsed),
                    });
                }
                parsed
            }
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let log_format = match vars.get("LOG_FORMAT").map(|s| s.as_str()) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected 'pretty' or 'json', got '{}'", other),
                })
            }
        };

        Ok(Config {
            database_url,
            bind_address,
            db_max_connections,
            log_format,
        })
    }
}
