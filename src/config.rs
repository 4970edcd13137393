//! Service configuration, read from the environment.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub nats_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}")]
    InvalidValue(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty()).ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = lookup("PORT").unwrap_or_else(|| "8083".to_string())
            .parse().map_err(|_| ConfigError::InvalidValue("PORT"))?;
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|| "10".to_string())
            .parse().map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;
        let nats_url = lookup("NATS_URL").filter(|v| !v.is_empty());
        Ok(Self { database_url, port, max_connections, nats_url })
    }

    pub fn listen_addr(&self) -> String { format!("0.0.0.0:{}", self.port) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.nats_url, None);
        assert_eq!(config.listen_addr(), "0.0.0.0:8083");
    }

    #[test]
    fn test_missing_database_url() {
        assert_eq!(Config::from_lookup(lookup(&[])), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")]));
        assert_eq!(err, Err(ConfigError::InvalidValue("PORT")));
    }

    #[test]
    fn test_nats_url() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("NATS_URL", "nats://localhost:4222")])).unwrap();
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
    }
}
