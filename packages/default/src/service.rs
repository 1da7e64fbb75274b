//! Create/List/Show orchestration for environments.
//!
//! Each operation authorizes the caller against the owning space before
//! touching the store. Show is the exception: the space is only known once
//! the record is loaded, so a caller without access learns that the id
//! exists before being refused.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{Identity, SCOPE_CONTRIBUTE, SCOPE_MANAGE, ScopeChecker};
use crate::clusters::{ClusterService, is_linked};
use crate::errors::ApiError;
use crate::models::environments::{Environment, NewEnvironment};
use crate::store::{EnvironmentStore, StoreError};

#[derive(Clone)]
pub struct EnvironmentService {
    store: Arc<dyn EnvironmentStore>,
    scopes: Arc<dyn ScopeChecker>,
    clusters: Arc<dyn ClusterService>,
}

impl EnvironmentService {
    pub fn new(
        store: Arc<dyn EnvironmentStore>,
        scopes: Arc<dyn ScopeChecker>,
        clusters: Arc<dyn ClusterService>,
    ) -> Self {
        Self {
            store,
            scopes,
            clusters,
        }
    }

    pub fn store(&self) -> &Arc<dyn EnvironmentStore> {
        &self.store
    }

    #[instrument(skip(self, caller, new_env), fields(identity = %caller.id, username = caller.username.as_deref().unwrap_or("-"), space_id = %new_env.space_id, name = %new_env.name))]
    pub async fn create(
        &self,
        caller: &Identity,
        new_env: NewEnvironment,
    ) -> Result<Environment, ApiError> {
        self.require_scope(caller, new_env.space_id, SCOPE_MANAGE)
            .await?;
        self.require_linked_cluster(caller, &new_env.cluster_url)
            .await?;

        let name = new_env.name.clone();
        let env = self.store.create(new_env).await.map_err(|e| {
            error!(err = %e, "failed to create environment: {name}");
            match e {
                StoreError::Conflict { message } => {
                    ApiError::Conflict(format!("failed to create environment: {name}: {message}"))
                }
                other => ApiError::Internal(format!("failed to create environment: {name}: {other}")),
            }
        })?;

        info!(env_id = %env.id, "✅ created environment");
        Ok(env)
    }

    #[instrument(skip(self, caller), fields(identity = %caller.id, username = caller.username.as_deref().unwrap_or("-")))]
    pub async fn list(&self, caller: &Identity, space_id: Uuid) -> Result<Vec<Environment>, ApiError> {
        self.require_scope(caller, space_id, SCOPE_CONTRIBUTE).await?;

        self.store.list(space_id).await.map_err(|e| {
            error!(err = %e, "failed to list environments");
            ApiError::Internal(format!("failed to list environments of space {space_id}: {e}"))
        })
    }

    #[instrument(skip(self, caller), fields(identity = %caller.id, username = caller.username.as_deref().unwrap_or("-")))]
    pub async fn show(&self, caller: &Identity, env_id: Uuid) -> Result<Environment, ApiError> {
        let env = self.store.load(env_id).await.map_err(|e| match e {
            StoreError::NotFound { id } => ApiError::NotFound {
                resource: "environment",
                id: id.to_string(),
            },
            other => {
                error!(err = %other, "failed to load environment");
                ApiError::Internal(format!("failed to load environment {env_id}: {other}"))
            }
        })?;

        self.require_scope(caller, env.space_id, SCOPE_CONTRIBUTE)
            .await?;
        Ok(env)
    }

    async fn require_scope(
        &self,
        caller: &Identity,
        space_id: Uuid,
        scope: &str,
    ) -> Result<(), ApiError> {
        self.scopes
            .check_scope(caller, space_id, scope)
            .await
            .map_err(|e| {
                warn!(%space_id, scope, err = %e, "space scope check failed");
                ApiError::from(e)
            })
    }

    async fn require_linked_cluster(
        &self,
        caller: &Identity,
        cluster_url: &str,
    ) -> Result<(), ApiError> {
        let clusters = self.clusters.user_clusters(caller).await.map_err(|e| {
            error!(err = %e, "failed to fetch the caller's clusters");
            ApiError::from(e)
        })?;

        if is_linked(&clusters, cluster_url) {
            Ok(())
        } else {
            warn!(cluster_url, "cluster is not linked to the caller's account");
            Err(ApiError::Forbidden(format!(
                "cluster '{cluster_url}' is not linked to your account"
            )))
        }
    }
}
