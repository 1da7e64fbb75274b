use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::option::Option;
use uuid::Uuid;

/// A deployment target owned by a space and bound to one cluster.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Environment {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub env_type: String,
    pub space_id: Uuid,
    pub namespace_name: Option<String>,
    pub cluster_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to insert an environment. The id and the
/// timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnvironment {
    pub name: String,
    pub env_type: String,
    pub space_id: Uuid,
    pub namespace_name: Option<String>,
    pub cluster_url: String,
}

/// Longest accepted environment type tag (a DNS label).
pub const MAX_TYPE_LEN: usize = 63;

/// Environment types are lowercase alphanumeric tags such as `stage` or
/// `run`; dashes are allowed after the first character.
pub fn is_valid_env_type(env_type: &str) -> bool {
    let mut chars = env_type.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    env_type.len() <= MAX_TYPE_LEN
        && (first.is_ascii_lowercase() || first.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
