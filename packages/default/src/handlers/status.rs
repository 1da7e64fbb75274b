use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::handlers::state::AppState;

const OK: &str = "OK";

#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub commit: String,
    #[serde(rename = "buildTime")]
    pub build_time: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "devMode", default, skip_serializing_if = "Option::is_none")]
    pub dev_mode: Option<bool>,
    #[serde(rename = "databaseStatus")]
    pub database_status: String,
    #[serde(rename = "configurationStatus")]
    pub configuration_status: String,
}

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> Response {
    let database_status = match state.store().ping().await {
        Ok(()) => OK.to_string(),
        Err(e) => {
            warn!(err = %e, "🩺 database ping failed");
            e.to_string()
        }
    };

    let problems = state.config().validate();
    let configuration_status = if problems.is_empty() {
        OK.to_string()
    } else {
        problems.join("; ")
    };

    let code = if database_status == OK && configuration_status == OK {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = Status {
        commit: option_env!("BUILD_COMMIT").unwrap_or("0").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("0").to_string(),
        start_time: state.started_at().to_rfc3339(),
        dev_mode: state.config().developer_mode.then_some(true),
        database_status,
        configuration_status,
    };

    (code, Json(body)).into_response()
}
