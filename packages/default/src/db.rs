use crate::models::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info, warn};

/// Start-up connection attempts before giving up.
pub const CONNECT_ATTEMPTS: u32 = 10;

/// Opens the connection pool, retrying while the database comes up.
pub async fn connect_with_retry(cfg: &DatabaseConfig) -> Result<PgPool> {
    let options = cfg.connect_options()?;
    let mut pool_options = PgPoolOptions::new().acquire_timeout(cfg.connect_timeout);
    if let Some(max) = cfg.max_open {
        pool_options = pool_options.max_connections(max);
    }
    if let Some(min) = cfg.min_idle {
        pool_options = pool_options.min_connections(min);
    }

    let mut attempt = 1;
    loop {
        debug!(host = %cfg.host, port = cfg.port, attempt, "connecting to database");
        match pool_options.clone().connect_with(options.clone()).await {
            Ok(pool) => {
                info!(host = %cfg.host, port = cfg.port, db = %cfg.name, "🗄️ connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    attempt,
                    "⏳ database not reachable ({e}), retrying in {:?}", cfg.retry_sleep
                );
                tokio::time::sleep(cfg.retry_sleep).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "connecting to database {}:{} after {attempt} attempts",
                        cfg.host, cfg.port
                    )
                });
            }
        }
    }
}

/// Applies the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running database migrations")?;
    info!("✅ database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_gives_up_on_bad_sslmode_without_retrying() {
        let cfg = DatabaseConfig {
            sslmode: "sometimes".to_string(),
            retry_sleep: Duration::from_secs(60),
            ..DatabaseConfig::default()
        };
        let started = Instant::now();
        assert!(connect_with_retry(&cfg).await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
