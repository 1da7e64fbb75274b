mod auth;
mod database;
mod log;
mod server;

pub use auth::*;
pub use database::*;
pub use log::*;
pub use server::*;

use anyhow::{Context, Result};
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "F8_CONFIG_FILE_PATH";

const DEV_AUTH_URL: &str = "https://auth.prod-preview.openshift.io";
const DEV_CLUSTER_URL: &str = "https://cluster.prod-preview.openshift.io";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EnvServiceConfig {
    pub developer_mode: bool,
    /// Deployment name reported to Sentry
    pub environment: String,
    pub log: LogConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cluster: ClusterConfig,
    pub sentry: SentryConfig,
}

impl Default for EnvServiceConfig {
    fn default() -> Self {
        Self {
            developer_mode: false,
            environment: "local".to_string(),
            log: LogConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cluster: ClusterConfig::default(),
            sentry: SentryConfig::default(),
        }
    }
}

impl EnvServiceConfig {
    /// Loads the configuration from an optional file, then overlays
    /// `F8_*` environment variables (`F8_DATABASE__HOST`, `F8_DEVELOPER_MODE`).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        debug!("config file => {:?}", config_path);

        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("F8")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("loading configuration")?;

        settings
            .try_deserialize::<Self>()
            .context("parsing configuration")
    }

    pub fn with_developer_mode(mut self, enabled: bool) -> Self {
        self.developer_mode = enabled;
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.database = database;
        self
    }

    pub fn with_sentry(mut self, sentry: SentryConfig) -> Self {
        self.sentry = sentry;
        self
    }

    pub fn log_json(&self) -> bool {
        self.log.json.unwrap_or(!self.developer_mode)
    }

    /// Auth service URL, falling back to the prod-preview service in developer mode.
    pub fn auth_url(&self) -> Option<String> {
        match &self.auth.url {
            Some(url) => Some(url.clone()),
            None if self.developer_mode => Some(DEV_AUTH_URL.to_string()),
            None => None,
        }
    }

    /// Cluster service URL, falling back to the prod-preview service in developer mode.
    pub fn cluster_url(&self) -> Option<String> {
        match &self.cluster.url {
            Some(url) => Some(url.clone()),
            None if self.developer_mode => Some(DEV_CLUSTER_URL.to_string()),
            None => None,
        }
    }

    /// Lists everything wrong with this configuration for a production
    /// deployment. An empty list means the configuration is fine.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.database.uses_default_password() {
            problems.push("default DB password is used".to_string());
        }
        if !self.developer_mode {
            if self.sentry.dsn.as_deref().is_none_or(str::is_empty) {
                problems.push("Sentry DSN is empty".to_string());
            }
            if self.auth_url().is_none() {
                problems.push("Auth service url is empty".to_string());
            }
            if self.cluster_url().is_none() {
                problems.push("Cluster service url is empty".to_string());
            }
        }

        problems
    }

    /// Copy safe to print or log.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        cfg.database.password = "********".to_string();
        if cfg.auth.token_secret.is_some() {
            cfg.auth.token_secret = Some("********".to_string());
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = EnvServiceConfig::default();
        assert!(!cfg.developer_mode);
        assert_eq!(cfg.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(cfg.database.port, 5436);
        assert_eq!(cfg.database.connect_timeout, Duration::from_secs(5));
        assert!(cfg.log_json());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            developer_mode = true

            [database]
            host = "db.internal"
            password = "s3cret"
            retry_sleep = "250ms"

            [auth]
            url = "http://auth.local"
            "#,
        );

        let cfg = EnvServiceConfig::load(Some(file.path())).unwrap();
        assert!(cfg.developer_mode);
        assert_eq!(cfg.database.host, "db.internal");
        assert_eq!(cfg.database.password, "s3cret");
        assert_eq!(cfg.database.retry_sleep, Duration::from_millis(250));
        // untouched keys keep their defaults
        assert_eq!(cfg.database.port, 5436);
        assert_eq!(cfg.auth_url().as_deref(), Some("http://auth.local"));
        assert!(!cfg.log_json());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = EnvServiceConfig::load(Some(Path::new("/nonexistent/env-service.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_service_urls_default_in_developer_mode() {
        let cfg = EnvServiceConfig::default();
        assert_eq!(cfg.auth_url(), None);
        assert_eq!(cfg.cluster_url(), None);

        let cfg = cfg.with_developer_mode(true);
        assert_eq!(cfg.auth_url().as_deref(), Some(DEV_AUTH_URL));
        assert_eq!(cfg.cluster_url().as_deref(), Some(DEV_CLUSTER_URL));
    }

    #[test]
    fn test_validate_reports_production_problems() {
        let problems = EnvServiceConfig::default().validate();
        assert_eq!(
            problems,
            vec![
                "default DB password is used",
                "Sentry DSN is empty",
                "Auth service url is empty",
                "Cluster service url is empty",
            ]
        );
    }

    #[test]
    fn test_validate_developer_mode_only_flags_password() {
        let problems = EnvServiceConfig::default()
            .with_developer_mode(true)
            .validate();
        assert_eq!(problems, vec!["default DB password is used"]);
    }

    #[test]
    fn test_validate_clean_configuration() {
        let cfg = EnvServiceConfig::default()
            .with_database(DatabaseConfig {
                password: "not-the-default".to_string(),
                ..DatabaseConfig::default()
            })
            .with_sentry(SentryConfig {
                dsn: Some("https://key@sentry.example/1".to_string()),
            })
            .with_auth(AuthConfig {
                url: Some("http://auth".to_string()),
                ..AuthConfig::default()
            })
            .with_cluster(ClusterConfig {
                url: Some("http://cluster".to_string()),
            });
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let cfg = EnvServiceConfig::default().with_auth(AuthConfig {
            token_secret: Some("hmac".to_string()),
            ..AuthConfig::default()
        });
        let redacted = cfg.redacted();
        assert_eq!(redacted.database.password, "********");
        assert_eq!(redacted.auth.token_secret.as_deref(), Some("********"));
        assert_eq!(cfg.database.password, DEFAULT_DB_PASSWORD);
    }

    #[test]
    fn test_connect_options_rejects_bad_sslmode() {
        let db = DatabaseConfig {
            sslmode: "sometimes".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(db.connect_options().is_err());
        assert!(DatabaseConfig::default().connect_options().is_ok());
    }
}
