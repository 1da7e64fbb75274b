use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};

use crate::auth::TokenManager;
use crate::models::config::EnvServiceConfig;
use crate::service::EnvironmentService;
use crate::store::EnvironmentStore;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    service: Arc<EnvironmentService>,
    tokens: Arc<TokenManager>,
    config: Arc<EnvServiceConfig>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        service: EnvironmentService,
        tokens: TokenManager,
        config: EnvServiceConfig,
    ) -> Self {
        Self {
            service: Arc::new(service),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }

    pub fn service(&self) -> &EnvironmentService {
        &self.service
    }

    pub fn store(&self) -> &Arc<dyn EnvironmentStore> {
        self.service.store()
    }

    pub fn config(&self) -> &EnvServiceConfig {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl FromRef<AppState> for Arc<TokenManager> {
    fn from_ref(state: &AppState) -> Arc<TokenManager> {
        state.tokens.clone()
    }
}
