use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

use super::{EnvironmentStore, StoreError, StoreResult};
use crate::models::environments::{Environment, NewEnvironment};
use crate::queries::environments::{
    get_environment, insert_environment, list_environments_by_space, ping,
};

/// Environment store backed by the `environments` table.
#[derive(Debug, Clone)]
pub struct PgEnvironmentStore {
    pool: PgPool,
}

impl PgEnvironmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn classify_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
            message: db_err.message().to_string(),
        },
        _ => StoreError::Persistence(err),
    }
}

#[async_trait]
impl EnvironmentStore for PgEnvironmentStore {
    #[instrument(skip(self, new_env), fields(name = %new_env.name, space_id = %new_env.space_id))]
    async fn create(&self, new_env: NewEnvironment) -> StoreResult<Environment> {
        insert_environment(&self.pool, &new_env).await.map_err(|e| {
            error!(err = %e, "unable to create the environment");
            classify_insert_error(e)
        })
    }

    #[instrument(skip(self))]
    async fn list(&self, space_id: Uuid) -> StoreResult<Vec<Environment>> {
        list_environments_by_space(&self.pool, space_id)
            .await
            .map_err(|e| {
                error!(err = %e, "unable to list the environments");
                StoreError::Persistence(e)
            })
    }

    #[instrument(skip(self))]
    async fn load(&self, id: Uuid) -> StoreResult<Environment> {
        match get_environment(&self.pool, id).await {
            Ok(Some(env)) => Ok(env),
            Ok(None) => Err(StoreError::NotFound { id }),
            Err(e) => {
                error!(err = %e, "unable to load the environment by ID");
                Err(StoreError::Persistence(e))
            }
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        ping(&self.pool).await.map_err(StoreError::Persistence)
    }
}
