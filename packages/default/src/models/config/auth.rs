use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Connection to the auth service and the inbound token verification keys.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the auth service used for space scope checks
    pub url: Option<String>,

    /// PEM file holding the RS256 public key tokens are signed with
    pub keys_path: Option<PathBuf>,

    /// Shared HS256 secret, for development setups without a key file
    pub token_secret: Option<String>,

    /// Timeout applied to every outbound call to the auth service
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: None,
            keys_path: None,
            token_secret: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Connection to the cluster service that knows which clusters an account
/// is linked to.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ClusterConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
}
