use sentry::ClientOptions;
use tracing::info;

use crate::models::config::EnvServiceConfig;

/// Initializes Sentry when a DSN is configured. The guard must be held for
/// the lifetime of the process.
pub fn init_sentry(cfg: &EnvServiceConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = cfg.sentry.dsn.as_deref().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        ClientOptions {
            release: sentry::release_name!(),
            environment: Some(cfg.environment.clone().into()),
            ..Default::default()
        },
    ));
    sentry::configure_scope(|scope| {
        scope.set_tag("service", env!("CARGO_PKG_NAME"));
        if let Some(commit) = option_env!("BUILD_COMMIT") {
            scope.set_tag("commit", commit);
        }
    });

    info!(environment = %cfg.environment, "📡 sentry error reporting enabled");
    Some(guard)
}

/// Forwards a server-side failure to Sentry. A no-op when Sentry is not
/// initialized.
pub fn report_error<E: std::error::Error + ?Sized>(err: &E) {
    sentry::capture_error(err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dsn_means_no_client() {
        assert!(init_sentry(&EnvServiceConfig::default()).is_none());

        let mut cfg = EnvServiceConfig::default();
        cfg.sentry.dsn = Some(String::new());
        assert!(init_sentry(&cfg).is_none());
    }
}
