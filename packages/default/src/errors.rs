//! API errors and their JSON:API rendering.
//!
//! Every failure a handler can return ends up as an [`ApiError`]. The
//! response body follows the JSON:API error document format:
//!
//! ```json
//! {"errors":[{"id":"...","code":"unauthorized_error","status":"401","title":"Unauthorized error","detail":"..."}]}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::auth::{ScopeError, TokenError};
use crate::reporting::report_error;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad value for parameter '{parameter}': {reason}")]
    BadParameter { parameter: String, reason: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadParameter { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadParameter { .. } => "bad_parameter",
            Self::Unauthorized(_) => "unauthorized_error",
            Self::Forbidden(_) => "forbidden_error",
            Self::NotFound { .. } => "not_found",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::Conflict(_) => "data_conflict_error",
            Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_server_error",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::BadParameter { .. } => "Bad parameter",
            Self::Unauthorized(_) => "Unauthorized error",
            Self::Forbidden(_) => "Forbidden error",
            Self::NotFound { .. } => "Not found error",
            Self::MethodNotAllowed(_) => "Method not allowed",
            Self::Conflict(_) => "Data conflict error",
            Self::Upstream(_) => "Upstream service error",
            Self::Internal(_) => "Internal server error",
        }
    }

    pub fn to_document(&self) -> ErrorDocument {
        let status = self.status();
        ErrorDocument {
            errors: vec![JsonApiError {
                id: Uuid::new_v4().to_string(),
                code: self.code().to_string(),
                status: status.as_u16().to_string(),
                title: self.title().to_string(),
                detail: self.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<JsonApiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonApiError {
    pub id: String,
    pub code: String,
    pub status: String,
    pub title: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), status = status.as_u16(), err = %self, "request failed");
            report_error(&self);
        } else {
            warn!(code = self.code(), status = status.as_u16(), err = %self, "request rejected");
        }
        (status, Json(self.to_document())).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<ScopeError> for ApiError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::Denied { .. } => ApiError::Unauthorized(err.to_string()),
            ScopeError::Upstream(e) => ApiError::from(e),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
