use crate::models::environments::{Environment, NewEnvironment};
use sqlx::PgPool;
use uuid::Uuid;

const ENVIRONMENT_COLUMNS: &str =
    "id, name, type, space_id, namespace_name, cluster_url, created_at, updated_at";

/// Insert a new environment and return the stored row, with the id and
/// timestamps filled in by the database.
pub async fn insert_environment(
    pool: &PgPool,
    new_env: &NewEnvironment,
) -> sqlx::Result<Environment> {
    sqlx::query_as::<_, Environment>(&format!(
        r#"
        INSERT INTO environments (name, type, space_id, namespace_name, cluster_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ENVIRONMENT_COLUMNS}
        "#
    ))
    .bind(&new_env.name)
    .bind(&new_env.env_type)
    .bind(new_env.space_id)
    .bind(&new_env.namespace_name)
    .bind(&new_env.cluster_url)
    .fetch_one(pool)
    .await
}

/// All live environments of a space, oldest first.
pub async fn list_environments_by_space(
    pool: &PgPool,
    space_id: Uuid,
) -> sqlx::Result<Vec<Environment>> {
    sqlx::query_as::<_, Environment>(&format!(
        r#"
        SELECT {ENVIRONMENT_COLUMNS}
        FROM environments
        WHERE space_id = $1 AND deleted_at IS NULL
        ORDER BY created_at, id
        "#
    ))
    .bind(space_id)
    .fetch_all(pool)
    .await
}

/// Fetch a live environment by id
pub async fn get_environment(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Environment>> {
    sqlx::query_as::<_, Environment>(&format!(
        "SELECT {ENVIRONMENT_COLUMNS} FROM environments WHERE id = $1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn ping(pool: &PgPool) -> sqlx::Result<()> {
    sqlx::query("SELECT 1 as health_check")
        .fetch_one(pool)
        .await
        .map(|_| ())
}
