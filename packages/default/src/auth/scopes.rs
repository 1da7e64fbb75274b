//! Space scope checks delegated to the auth service.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::token::Identity;
use crate::upstream::{UpstreamClient, UpstreamError};

pub const SCOPE_VIEW: &str = "view";
pub const SCOPE_CONTRIBUTE: &str = "contribute";
pub const SCOPE_MANAGE: &str = "manage";

const AUTH_SERVICE: &str = "auth service";

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("user doesn't have '{scope}' permission on '{resource_id}' space")]
    Denied { scope: String, resource_id: Uuid },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[async_trait]
pub trait ScopeChecker: Send + Sync + 'static {
    /// Succeeds when `caller` holds `required_scope` on the resource.
    async fn check_scope(
        &self,
        caller: &Identity,
        resource_id: Uuid,
        required_scope: &str,
    ) -> Result<(), ScopeError>;
}

#[derive(Debug, Deserialize)]
struct ResourceScopes {
    data: Vec<ResourceScope>,
}

#[derive(Debug, Deserialize)]
struct ResourceScope {
    id: String,
}

/// Asks the auth service which scopes the caller holds on a resource.
#[derive(Debug, Clone)]
pub struct AuthServiceClient {
    client: UpstreamClient,
}

impl AuthServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: UpstreamClient::new(AUTH_SERVICE, base_url, timeout)?,
        })
    }

    pub async fn resource_scopes(
        &self,
        caller: &Identity,
        resource_id: Uuid,
    ) -> Result<Vec<String>, UpstreamError> {
        let scopes: ResourceScopes = self
            .client
            .get_json(&format!("/api/resource/{resource_id}/scopes"), &caller.token)
            .await?;
        Ok(scopes.data.into_iter().map(|s| s.id).collect())
    }
}

#[async_trait]
impl ScopeChecker for AuthServiceClient {
    #[instrument(skip(self, caller), fields(identity = %caller.id))]
    async fn check_scope(
        &self,
        caller: &Identity,
        resource_id: Uuid,
        required_scope: &str,
    ) -> Result<(), ScopeError> {
        let scopes = self.resource_scopes(caller, resource_id).await?;
        debug!(?scopes, "scopes granted by the auth service");

        if scopes.iter().any(|s| s == required_scope) {
            Ok(())
        } else {
            Err(ScopeError::Denied {
                scope: required_scope.to_string(),
                resource_id,
            })
        }
    }
}

/// Fixed scope grants per identity, for tests and offline development.
/// Grants apply to every resource.
#[derive(Debug, Clone, Default)]
pub struct StaticScopes {
    grants: HashMap<Uuid, Vec<String>>,
    unavailable: bool,
}

impl StaticScopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, identity: Uuid, scopes: &[&str]) -> Self {
        self.grants
            .entry(identity)
            .or_default()
            .extend(scopes.iter().map(|s| s.to_string()));
        self
    }

    /// Every check fails as if the auth service could not be reached.
    pub fn unavailable() -> Self {
        Self {
            grants: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl ScopeChecker for StaticScopes {
    async fn check_scope(
        &self,
        caller: &Identity,
        resource_id: Uuid,
        required_scope: &str,
    ) -> Result<(), ScopeError> {
        if self.unavailable {
            return Err(UpstreamError::Unavailable {
                service: AUTH_SERVICE,
                message: "static scopes configured as unavailable".to_string(),
            }
            .into());
        }

        let granted = self
            .grants
            .get(&caller.id)
            .is_some_and(|scopes| scopes.iter().any(|s| s == required_scope));
        if granted {
            Ok(())
        } else {
            Err(ScopeError::Denied {
                scope: required_scope.to_string(),
                resource_id,
            })
        }
    }
}
