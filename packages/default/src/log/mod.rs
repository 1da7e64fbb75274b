use crate::models::config::EnvServiceConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `log.level`.
pub fn init_logging(cfg: &EnvServiceConfig) {
    let filter = env_filter(&cfg.log.level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if cfg.log_json() {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("logging already initialized: {e}");
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_is_the_default() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(env_filter("debug").to_string(), "debug");
    }
}
