use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::time::Duration;

/// Password shipped in the defaults. Running with it outside of a
/// developer machine is reported as a configuration problem.
pub const DEFAULT_DB_PASSWORD: &str = "mysecretpassword";

/// PostgreSQL database connection configuration.
///
/// This section is loaded from `[database]` in the config file or from
/// `F8_DATABASE__*` environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// One of `disable`, `allow`, `prefer`, `require`, `verify-ca`, `verify-full`
    pub sslmode: String,
    /// How long to wait for a connection before giving up on an attempt
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Pause between start-up connection attempts
    #[serde(with = "humantime_serde")]
    pub retry_sleep: Duration,
    /// Upper bound of open connections in the pool
    pub max_open: Option<u32>,
    /// Connections kept warm in the pool
    pub min_idle: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5436,
            user: "postgres".to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            name: "postgres".to_string(),
            sslmode: "disable".to_string(),
            connect_timeout: Duration::from_secs(5),
            retry_sleep: Duration::from_secs(1),
            max_open: None,
            min_idle: None,
        }
    }
}

impl DatabaseConfig {
    /// Builds sqlx connect options from the configured parameters.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let ssl_mode = self
            .sslmode
            .parse::<PgSslMode>()
            .with_context(|| format!("invalid database sslmode '{}'", self.sslmode))?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode))
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_DB_PASSWORD
    }
}
