use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    /// Emit JSON lines. When unset, JSON is used unless developer mode is on.
    pub json: Option<bool>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: None,
        }
    }
}
