//! Persistence for environment records.
//!
//! The [`EnvironmentStore`] trait is what the service layer talks to.
//! [`PgEnvironmentStore`] backs it with the `environments` table;
//! [`MemoryEnvironmentStore`] keeps everything in process for tests and
//! local development.

mod memory;
mod postgres;

pub use memory::MemoryEnvironmentStore;
pub use postgres::PgEnvironmentStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::environments::{Environment, NewEnvironment};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("environment not found: {id}")]
    NotFound { id: Uuid },

    /// A unique constraint rejected the insert.
    #[error("environment already exists: {message}")]
    Conflict { message: String },

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EnvironmentStore: Send + Sync + 'static {
    /// Inserts a new environment, assigning its id and timestamps.
    async fn create(&self, new_env: NewEnvironment) -> StoreResult<Environment>;

    /// All environments of one space. Empty when the space has none.
    async fn list(&self, space_id: Uuid) -> StoreResult<Vec<Environment>>;

    async fn load(&self, id: Uuid) -> StoreResult<Environment>;

    /// Cheap round-trip used by `GET /api/status`.
    async fn ping(&self) -> StoreResult<()>;
}
