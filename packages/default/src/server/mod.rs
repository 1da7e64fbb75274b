use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderName, Method, Uri},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    CompressionLevel,
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
};
use tracing::{Instrument, debug, info, info_span};

use crate::errors::ApiError;
use crate::handlers::{AppState, environments, status};

/// Inbound ids are kept, otherwise a uuid v4 is assigned. Echoed on the response.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// All public routes, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/spaces/{space_id}/environments",
            get(environments::list).post(environments::create),
        )
        .route("/api/environments/{env_id}", get(environments::show))
        .route("/api/status", get(status::status))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(request_span))
        .layer(CompressionLayer::new().gzip(true).quality(CompressionLevel::Best))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_string(),
    }
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!(
        "method {method} is not allowed on {}",
        uri.path()
    ))
}

async fn request_span(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let span = info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    );
    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}

/// Serves `app` until ctrl-c or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    info!(
        "🚀 listening on {}",
        listener.local_addr().context("reading listener address")?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ failed to listen for ctrl-c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("❌ failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("🛑 shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{StaticScopes, TokenManager};
    use crate::clusters::StaticClusters;
    use crate::errors::ErrorDocument;
    use crate::models::config::EnvServiceConfig;
    use crate::service::EnvironmentService;
    use crate::store::MemoryEnvironmentStore;
    use crate::test_support::TEST_SECRET;
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use std::sync::Arc;

    fn test_server() -> TestServer {
        let service = EnvironmentService::new(
            Arc::new(MemoryEnvironmentStore::new()),
            Arc::new(StaticScopes::new()),
            Arc::new(StaticClusters::default()),
        );
        let state = AppState::new(
            service,
            TokenManager::from_hmac_secret(TEST_SECRET),
            EnvServiceConfig::default(),
        );
        TestServer::new(router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_api_404() {
        let response = test_server().get("/api/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorDocument = response.json();
        assert_eq!(body.errors[0].code, "not_found");
        assert_eq!(body.errors[0].status, "404");
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_api_405() {
        let response = test_server().delete("/api/status").await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let body: ErrorDocument = response.json();
        assert_eq!(body.errors[0].code, "method_not_allowed");
    }

    #[tokio::test]
    async fn test_inbound_request_id_is_echoed() {
        let response = test_server()
            .get("/api/status")
            .add_header(REQUEST_ID_HEADER, HeaderValue::from_static("req-1234"))
            .await;
        assert_eq!(response.header(REQUEST_ID_HEADER), "req-1234");
    }

    #[tokio::test]
    async fn test_request_id_is_assigned_when_missing() {
        let response = test_server().get("/api/nope").await;
        let id = response.header(REQUEST_ID_HEADER);
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_responses_are_gzipped_on_request() {
        let response = test_server()
            .get("/api/status")
            .add_header(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
            .await;
        assert_eq!(response.header(header::CONTENT_ENCODING), "gzip");
    }
}
