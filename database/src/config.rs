use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::SqliteConnectOptions;

use crate::DatabaseError;

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub connect_retries: usize,
    pub connect_delay: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_retries: 3,
            connect_delay: Duration::from_millis(200),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_URL)
    }

    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            IN_MEMORY_URL.to_string()
        };

        Self::new(url)
    }

    /// Accepts either a `sqlite:` URL or a bare file path.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        let options = if self.url.starts_with("sqlite:") || self.url == ":memory:" {
            SqliteConnectOptions::from_str(&self.url)
                .map_err(|e| DatabaseError::Connection(format!("{}: {e}", self.url)))?
        } else {
            SqliteConnectOptions::new().filename(&self.url)
        };
        Ok(options.create_if_missing(true))
    }
}
