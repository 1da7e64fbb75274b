//! Which clusters a caller's account is linked to, as reported by the
//! cluster service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use crate::auth::Identity;
use crate::upstream::{UpstreamClient, UpstreamError};

const CLUSTER_SERVICE: &str = "cluster service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub name: String,
    #[serde(rename = "api-url")]
    pub api_url: String,
    #[serde(rename = "console-url", default, skip_serializing_if = "Option::is_none")]
    pub console_url: Option<String>,
}

impl ClusterInfo {
    pub fn new(name: &str, api_url: &str) -> Self {
        Self {
            name: name.to_string(),
            api_url: api_url.to_string(),
            console_url: None,
        }
    }
}

#[async_trait]
pub trait ClusterService: Send + Sync + 'static {
    async fn user_clusters(&self, caller: &Identity) -> Result<Vec<ClusterInfo>, UpstreamError>;
}

/// True when `cluster_url` is exactly the API URL of one of `clusters`.
pub fn is_linked(clusters: &[ClusterInfo], cluster_url: &str) -> bool {
    clusters.iter().any(|c| c.api_url == cluster_url)
}

#[derive(Debug, Deserialize)]
struct UserClusters {
    data: Vec<ClusterInfo>,
}

#[derive(Debug, Clone)]
pub struct ClusterServiceClient {
    client: UpstreamClient,
}

impl ClusterServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: UpstreamClient::new(CLUSTER_SERVICE, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl ClusterService for ClusterServiceClient {
    #[instrument(skip(self, caller), fields(identity = %caller.id))]
    async fn user_clusters(&self, caller: &Identity) -> Result<Vec<ClusterInfo>, UpstreamError> {
        let clusters: UserClusters = self
            .client
            .get_json("/api/user/clusters", &caller.token)
            .await?;
        Ok(clusters.data)
    }
}

/// Same cluster list for every caller.
#[derive(Debug, Clone, Default)]
pub struct StaticClusters {
    clusters: Vec<ClusterInfo>,
    unavailable: bool,
}

impl StaticClusters {
    pub fn new(clusters: Vec<ClusterInfo>) -> Self {
        Self {
            clusters,
            unavailable: false,
        }
    }

    /// Every lookup fails as if the cluster service could not be reached.
    pub fn unavailable() -> Self {
        Self {
            clusters: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl ClusterService for StaticClusters {
    async fn user_clusters(&self, _caller: &Identity) -> Result<Vec<ClusterInfo>, UpstreamError> {
        if self.unavailable {
            return Err(UpstreamError::Unavailable {
                service: CLUSTER_SERVICE,
                message: "static clusters configured as unavailable".to_string(),
            });
        }
        Ok(self.clusters.clone())
    }
}
