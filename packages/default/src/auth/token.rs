//! Inbound token verification.
//!
//! Tokens are JWTs issued by the auth service. Production deployments
//! verify them with the service's RS256 public key; development setups can
//! use a shared HS256 secret instead.

use anyhow::{Context, bail};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::config::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id of the caller
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    pub exp: usize,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: Option<String>,
    /// Raw bearer token, forwarded to the auth and cluster services
    pub token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing Authorization header")]
    Missing,

    #[error("Authorization header is not a bearer token")]
    Malformed,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token subject '{0}' is not an identity id")]
    InvalidSubject(String),
}

pub struct TokenManager {
    key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    pub fn from_hmac_secret(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        Ok(Self::with_key(
            DecodingKey::from_rsa_pem(pem)?,
            Algorithm::RS256,
        ))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // audience is not pinned
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Picks the key source from the `[auth]` section: the PEM file wins
    /// over the shared secret.
    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        if let Some(path) = &cfg.keys_path {
            let pem = std::fs::read(path)
                .with_context(|| format!("reading auth public key {}", path.display()))?;
            return Self::from_rsa_pem(&pem)
                .with_context(|| format!("parsing auth public key {}", path.display()));
        }
        if let Some(secret) = &cfg.token_secret {
            return Ok(Self::from_hmac_secret(secret.as_bytes()));
        }
        bail!("either auth.keys_path or auth.token_secret must be configured")
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }

    /// Resolves the caller from the `Authorization: Bearer` header.
    pub fn identity(&self, headers: &HeaderMap) -> Result<Identity, TokenError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(TokenError::Missing)?
            .to_str()
            .map_err(|_| TokenError::Malformed)?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::Malformed)?;

        let claims = self.validate(token)?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| TokenError::InvalidSubject(claims.sub.clone()))?;

        Ok(Identity {
            id,
            username: claims.preferred_username,
            token: token.to_string(),
        })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    Arc<TokenManager>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenManager>::from_ref(state);
        tokens.identity(&parts.headers).map_err(|e| {
            debug!(err = %e, path = %parts.uri.path(), "rejecting unauthenticated request");
            ApiError::from(e)
        })
    }
}
