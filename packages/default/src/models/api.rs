//! JSON:API documents exchanged over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::environments::{Environment, NewEnvironment, is_valid_env_type};

pub const ENVIRONMENT_TYPE: &str = "environments";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub env_type: Option<String>,
    #[serde(rename = "namespaceName", default, skip_serializing_if = "Option::is_none")]
    pub namespace_name: Option<String>,
    #[serde(rename = "cluster-url", default, skip_serializing_if = "Option::is_none")]
    pub cluster_url: Option<String>,
    #[serde(rename = "created-at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated-at", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentData {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub attributes: Option<EnvironmentAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<GenericLinks>,
}

impl EnvironmentData {
    /// `base_url` is the absolute API root, e.g. `https://env.example/api`.
    pub fn from_environment(env: &Environment, base_url: &str) -> Self {
        Self {
            resource_type: ENVIRONMENT_TYPE.to_string(),
            id: Some(env.id),
            attributes: Some(EnvironmentAttributes {
                name: Some(env.name.clone()),
                env_type: Some(env.env_type.clone()),
                namespace_name: env.namespace_name.clone(),
                cluster_url: Some(env.cluster_url.clone()),
                created_at: Some(env.created_at),
                updated_at: Some(env.updated_at),
            }),
            links: Some(GenericLinks {
                self_link: Some(environment_href(base_url, env.id)),
            }),
        }
    }
}

pub fn environment_href(base_url: &str, id: Uuid) -> String {
    format!("{base_url}/environments/{id}")
}

/// Single-resource document, used both as the create payload and as the
/// create/show response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSingle {
    #[serde(default)]
    pub data: Option<EnvironmentData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentListMeta {
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentList {
    pub data: Vec<EnvironmentData>,
    pub meta: EnvironmentListMeta,
}

impl EnvironmentList {
    pub fn from_environments(envs: &[Environment], base_url: &str) -> Self {
        Self {
            data: envs
                .iter()
                .map(|env| EnvironmentData::from_environment(env, base_url))
                .collect(),
            meta: EnvironmentListMeta {
                total_count: envs.len(),
            },
        }
    }
}

fn required(value: Option<String>, parameter: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_parameter(parameter, "expected not empty")),
    }
}

impl EnvironmentSingle {
    /// Validates a create payload and turns it into an insertable record
    /// owned by `space_id`.
    pub fn into_new_environment(self, space_id: Uuid) -> Result<NewEnvironment, ApiError> {
        let data = self
            .data
            .ok_or_else(|| ApiError::bad_parameter("data", "expected not nil"))?;
        if data.resource_type != ENVIRONMENT_TYPE {
            return Err(ApiError::bad_parameter(
                "data.type",
                format!("expected '{ENVIRONMENT_TYPE}', got '{}'", data.resource_type),
            ));
        }
        let attrs = data
            .attributes
            .ok_or_else(|| ApiError::bad_parameter("data.attributes", "expected not nil"))?;

        let name = required(attrs.name, "data.attributes.name")?;
        let env_type = required(attrs.env_type, "data.attributes.type")?;
        if !is_valid_env_type(&env_type) {
            return Err(ApiError::bad_parameter(
                "data.attributes.type",
                format!("'{env_type}' is not a lowercase alphanumeric tag"),
            ));
        }
        let cluster_url = required(attrs.cluster_url, "data.attributes.cluster-url")?;
        let namespace_name = attrs
            .namespace_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(NewEnvironment {
            name,
            env_type,
            space_id,
            namespace_name,
            cluster_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(attributes: serde_json::Value) -> EnvironmentSingle {
        serde_json::from_value(json!({
            "data": {"type": "environments", "attributes": attributes}
        }))
        .unwrap()
    }

    fn bad_parameter(result: Result<NewEnvironment, ApiError>) -> String {
        match result {
            Err(ApiError::BadParameter { parameter, .. }) => parameter,
            other => panic!("expected BadParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload() {
        let space_id = Uuid::new_v4();
        let new_env = payload(json!({
            "name": "osio-stage",
            "type": "stage",
            "namespaceName": "osio-stage-ns",
            "cluster-url": "cluster1.com"
        }))
        .into_new_environment(space_id)
        .unwrap();

        assert_eq!(
            new_env,
            NewEnvironment {
                name: "osio-stage".to_string(),
                env_type: "stage".to_string(),
                space_id,
                namespace_name: Some("osio-stage-ns".to_string()),
                cluster_url: "cluster1.com".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let space_id = Uuid::new_v4();
        let missing_name = payload(json!({"type": "stage", "cluster-url": "c"}));
        let missing_type = payload(json!({"name": "n", "cluster-url": "c"}));
        let missing_cluster = payload(json!({"name": "n", "type": "stage"}));
        let blank_name = payload(json!({"name": "  ", "type": "stage", "cluster-url": "c"}));

        assert_eq!(
            bad_parameter(missing_name.into_new_environment(space_id)),
            "data.attributes.name"
        );
        assert_eq!(
            bad_parameter(missing_type.into_new_environment(space_id)),
            "data.attributes.type"
        );
        assert_eq!(
            bad_parameter(missing_cluster.into_new_environment(space_id)),
            "data.attributes.cluster-url"
        );
        assert_eq!(
            bad_parameter(blank_name.into_new_environment(space_id)),
            "data.attributes.name"
        );
    }

    #[test]
    fn test_missing_data_and_wrong_type() {
        let space_id = Uuid::new_v4();
        let no_data = EnvironmentSingle { data: None };
        assert_eq!(bad_parameter(no_data.into_new_environment(space_id)), "data");

        let wrong: EnvironmentSingle = serde_json::from_value(json!({
            "data": {"type": "spaces", "attributes": {"name": "n", "type": "stage", "cluster-url": "c"}}
        }))
        .unwrap();
        assert_eq!(bad_parameter(wrong.into_new_environment(space_id)), "data.type");

        let bad_type = payload(json!({"name": "n", "type": "Stage!", "cluster-url": "c"}));
        assert_eq!(
            bad_parameter(bad_type.into_new_environment(space_id)),
            "data.attributes.type"
        );
    }

    #[test]
    fn test_environment_serialization() {
        let now = Utc::now();
        let env = Environment {
            id: Uuid::new_v4(),
            name: "osio-stage".to_string(),
            env_type: "stage".to_string(),
            space_id: Uuid::new_v4(),
            namespace_name: None,
            cluster_url: "cluster1.com".to_string(),
            created_at: now,
            updated_at: now,
        };
        let value =
            serde_json::to_value(EnvironmentData::from_environment(&env, "http://host/api")).unwrap();

        assert_eq!(value["type"], "environments");
        assert_eq!(value["id"], env.id.to_string());
        assert_eq!(value["attributes"]["name"], "osio-stage");
        assert_eq!(value["attributes"]["type"], "stage");
        assert_eq!(value["attributes"]["cluster-url"], "cluster1.com");
        assert!(value["attributes"].get("namespaceName").is_none());
        assert_eq!(
            value["links"]["self"],
            format!("http://host/api/environments/{}", env.id)
        );
    }

    #[test]
    fn test_list_meta_counts_entries() {
        let list = EnvironmentList::from_environments(&[], "http://host/api");
        assert_eq!(list.meta.total_count, 0);
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value, json!({"data": [], "meta": {"totalCount": 0}}));
    }
}
