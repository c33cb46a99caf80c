use std::env;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://user-directory.db?mode=rwc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Pool size override; the factory picks a per-backend default when unset.
    pub max_connections: Option<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            port: parse_var("PORT")?.unwrap_or(3000),
            max_connections: parse_var("DB_MAX_CONNECTIONS")?,
        })
    }

    pub fn is_postgres(&self) -> bool {
        self.database_url.starts_with("postgres://") || self.database_url.starts_with("postgresql://")
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { key, value }),
        Err(_) => Ok(None),
    }
}
