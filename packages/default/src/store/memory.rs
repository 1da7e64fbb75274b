use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EnvironmentStore, StoreError, StoreResult};
use crate::models::environments::{Environment, NewEnvironment};

/// In-process environment store.
///
/// Records are kept in insertion order, which is also creation order, so
/// `list` matches the ordering of the Postgres store.
#[derive(Debug, Default)]
pub struct MemoryEnvironmentStore {
    environments: RwLock<Vec<Environment>>,
    unavailable: AtomicBool,
}

impl MemoryEnvironmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.environments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentStore for MemoryEnvironmentStore {
    async fn create(&self, new_env: NewEnvironment) -> StoreResult<Environment> {
        self.check_available()?;
        let now = Utc::now();
        let env = Environment {
            id: Uuid::new_v4(),
            name: new_env.name,
            env_type: new_env.env_type,
            space_id: new_env.space_id,
            namespace_name: new_env.namespace_name,
            cluster_url: new_env.cluster_url,
            created_at: now,
            updated_at: now,
        };
        self.environments.write().await.push(env.clone());
        Ok(env)
    }

    async fn list(&self, space_id: Uuid) -> StoreResult<Vec<Environment>> {
        self.check_available()?;
        Ok(self
            .environments
            .read()
            .await
            .iter()
            .filter(|env| env.space_id == space_id)
            .cloned()
            .collect())
    }

    async fn load(&self, id: Uuid) -> StoreResult<Environment> {
        self.check_available()?;
        self.environments
            .read()
            .await
            .iter()
            .find(|env| env.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_env(space_id: Uuid, name: &str) -> NewEnvironment {
        NewEnvironment {
            name: name.to_string(),
            env_type: "stage".to_string(),
            space_id,
            namespace_name: None,
            cluster_url: "cluster1.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = MemoryEnvironmentStore::new();
        let env = store.create(new_env(Uuid::new_v4(), "osio-stage")).await.unwrap();
        assert!(!env.id.is_nil());
        assert_eq!(env.created_at, env.updated_at);
        assert_eq!(store.load(env.id).await.unwrap(), env);
    }

    #[tokio::test]
    async fn test_list_keeps_spaces_apart_and_in_order() {
        let store = MemoryEnvironmentStore::new();
        let space_a = Uuid::new_v4();
        let space_b = Uuid::new_v4();

        let first = store.create(new_env(space_a, "first")).await.unwrap();
        store.create(new_env(space_b, "other")).await.unwrap();
        let second = store.create(new_env(space_a, "second")).await.unwrap();

        assert_eq!(store.list(space_a).await.unwrap(), vec![first, second]);
        assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let store = MemoryEnvironmentStore::new();
        assert!(matches!(
            store.load(Uuid::new_v4()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = MemoryEnvironmentStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(StoreError::Persistence(_))));
        assert!(matches!(
            store.create(new_env(Uuid::new_v4(), "x")).await,
            Err(StoreError::Persistence(_))
        ));
        assert!(store.is_empty().await);

        store.set_unavailable(false);
        store.ping().await.unwrap();
    }
}
