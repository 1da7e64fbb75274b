use anyhow::Context;
use clap::Parser;
use env_service::{
    auth::{AuthServiceClient, TokenManager},
    clusters::ClusterServiceClient,
    db::{connect_with_retry, migrate},
    handlers::AppState,
    log::init_logging,
    models::config::{CONFIG_PATH_ENV, EnvServiceConfig},
    reporting::init_sentry,
    server::{router, serve},
    service::EnvironmentService,
    store::PgEnvironmentStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "env-service", about = "Environment API for spaces", version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Migrate the database schema and exit
    #[arg(long)]
    migrate_database: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = EnvServiceConfig::load(cli.config.as_deref())?;
    if cli.print_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&cfg.redacted()).context("serializing configuration")?
        );
        return Ok(());
    }

    init_logging(&cfg);
    let _sentry = init_sentry(&cfg);

    if let Err(e) = run(cli, cfg).await {
        sentry::integrations::anyhow::capture_anyhow(&e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, cfg: EnvServiceConfig) -> anyhow::Result<()> {
    info!("Env service: starting...");
    debug!(config = ?cfg.redacted(), "effective configuration");
    if cfg.developer_mode {
        warn!("🧪 developer mode is enabled");
    }
    for problem in cfg.validate() {
        warn!("⚠️ configuration problem: {problem}");
    }

    debug!("======== INITIALIZING DATABASE ========");
    let pool = connect_with_retry(&cfg.database).await?;
    migrate(&pool).await?;
    if cli.migrate_database {
        info!("migration finished, exiting");
        return Ok(());
    }

    let tokens = TokenManager::from_config(&cfg.auth)?;
    let auth_url = cfg
        .auth_url()
        .context("auth.url is required outside developer mode")?;
    let cluster_url = cfg
        .cluster_url()
        .context("cluster.url is required outside developer mode")?;
    info!(%auth_url, %cluster_url, "upstream services");

    let scopes = AuthServiceClient::new(&auth_url, cfg.auth.request_timeout)?;
    let clusters = ClusterServiceClient::new(&cluster_url, cfg.auth.request_timeout)?;
    let service = EnvironmentService::new(
        Arc::new(PgEnvironmentStore::new(pool)),
        Arc::new(scopes),
        Arc::new(clusters),
    );

    let bind = cfg.server.bind_address();
    let state = AppState::new(service, tokens, cfg);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    serve(listener, router(state)).await
}
