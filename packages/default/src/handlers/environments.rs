use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::handlers::state::AppState;
use crate::models::api::{EnvironmentData, EnvironmentList, EnvironmentSingle, environment_href};

/// First entry of a possibly comma-separated forwarding header.
fn forwarded(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `{scheme}://{host}/api`, taken from the inbound request.
pub fn api_base_url(headers: &HeaderMap) -> String {
    let scheme = forwarded(headers, "x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = forwarded(headers, "x-forwarded-host")
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "localhost".to_string());
    format!("{scheme}://{host}/api")
}

fn uuid_param(path: Result<Path<Uuid>, PathRejection>, name: &str) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_parameter(name, e.body_text()))
}

/// `POST /api/spaces/{spaceID}/environments`
pub async fn create(
    caller: Identity,
    State(state): State<AppState>,
    headers: HeaderMap,
    space_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EnvironmentSingle>, JsonRejection>,
) -> Result<Response, ApiError> {
    let space_id = uuid_param(space_id, "spaceID")?;
    let Json(payload) = payload.map_err(|e| ApiError::bad_parameter("data", e.body_text()))?;
    let new_env = payload.into_new_environment(space_id)?;

    let env = state.service().create(&caller, new_env).await?;

    let base_url = api_base_url(&headers);
    let location = environment_href(&base_url, env.id);
    info!(env_id = %env.id, %space_id, "🌱 environment created at {location}");

    let body = EnvironmentSingle {
        data: Some(EnvironmentData::from_environment(&env, &base_url)),
    };
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response())
}

/// `GET /api/spaces/{spaceID}/environments`
pub async fn list(
    caller: Identity,
    State(state): State<AppState>,
    headers: HeaderMap,
    space_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EnvironmentList>, ApiError> {
    let space_id = uuid_param(space_id, "spaceID")?;
    let envs = state.service().list(&caller, space_id).await?;
    debug!(%space_id, count = envs.len(), "listed environments");

    Ok(Json(EnvironmentList::from_environments(
        &envs,
        &api_base_url(&headers),
    )))
}

/// `GET /api/environments/{envID}`
pub async fn show(
    caller: Identity,
    State(state): State<AppState>,
    headers: HeaderMap,
    env_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EnvironmentSingle>, ApiError> {
    let env_id = uuid_param(env_id, "envID")?;
    let env = state.service().show(&caller, env_id).await?;

    Ok(Json(EnvironmentSingle {
        data: Some(EnvironmentData::from_environment(
            &env,
            &api_base_url(&headers),
        )),
    }))
}
