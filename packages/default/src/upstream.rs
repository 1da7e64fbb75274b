//! Plumbing shared by the clients of the auth and cluster services.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure talking to another service. Never means "permission denied".
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with '{status}'")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} returned an undecodable body: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} is unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
}

/// Thin JSON-over-HTTP client for one upstream service. The caller's bearer
/// token is forwarded on every request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    service: &'static str,
    base_url: String,
    http: Client,
}

impl UpstreamClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| UpstreamError::Transport { service, source })?;

        Ok(Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GETs `path` (relative to the base URL) and decodes a JSON body.
    /// Anything but a 200 is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, UpstreamError> {
        let service = self.service;
        let url = format!("{}{}", self.base_url, path);
        debug!(service, %url, "calling upstream service");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service, source })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(service, %url, %status, "upstream call failed");
            return Err(UpstreamError::Status { service, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| UpstreamError::Decode { service, source })
    }
}
