//! Typed JSON view of the `GameServer` custom resource.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::{validate_dns_label, validate_dns_subdomain};

/// Desired state of a game server as requested by users.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerSpec {
    /// Short game identifier routed by the composition (`sdtd`, `ce`, `pw`, `vh`, `we`, `ln`).
    #[serde(default)]
    pub game_type: String,
    pub server_name: Option<String>,
    pub server_description: Option<String>,
    pub resources: Option<GameServerResources>,
    pub networking: Option<GameServerNetworking>,
    /// Game specific settings passed through untouched.
    #[schema(value_type = Option<Object>)]
    pub game_config: Option<IndexMap<String, Value>>,
    pub advanced: Option<GameServerAdvanced>,
}

/// Compute and storage sizing, expressed as Kubernetes quantities.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerResources {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub storage_size: Option<String>,
    pub storage_class: Option<String>,
}

/// How the server is exposed outside the cluster.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerNetworking {
    pub service_type: Option<String>,
    pub enable_ingress: Option<bool>,
    pub ingress_host: Option<String>,
}

/// Scheduling and environment overrides.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerAdvanced {
    #[schema(value_type = Option<Object>)]
    pub affinity: Option<serde_json::Map<String, Value>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub tolerations: Option<Vec<serde_json::Map<String, Value>>>,
    pub custom_env_vars: Option<BTreeMap<String, String>>,
}

/// Observed state reported by the composition engine.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerStatus {
    pub phase: Option<String>,
    pub child_type: Option<String>,
    pub child_name: Option<String>,
    #[serde(rename = "serverIP")]
    pub server_ip: Option<String>,
    pub game_port: Option<i64>,
    pub web_port: Option<i64>,
    pub server_endpoint: Option<String>,
    pub players_online: Option<i64>,
    pub last_update: Option<String>,
    pub conditions: Option<Vec<GameServerCondition>>,
}

/// Single status condition, mirroring `metav1.Condition`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerCondition {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub last_transition_time: Option<String>,
}

/// Object metadata exposed for a game server.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServerMetadata {
    pub name: String,
    pub namespace: Option<String>,
    /// RFC 3339 creation time assigned by the API server.
    pub creation_timestamp: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Full game server representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameServer {
    pub api_version: String,
    pub kind: String,
    pub metadata: GameServerMetadata,
    pub spec: GameServerSpec,
    pub status: GameServerStatus,
}

/// Response of the list endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameServerList {
    pub items: Vec<GameServer>,
    pub total: usize,
}

/// Metadata accepted when creating a game server.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct GameServerMetadataInput {
    #[serde(default)]
    #[validate(custom(function = "validate_dns_subdomain"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_dns_label"))]
    pub namespace: Option<String>,
    /// Extra labels merged over the defaults set by the API.
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Payload accepted by `POST /api/v1/gameservers`.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameServerRequest {
    /// Defaults to `gameplane.kubelize.io/v1alpha1`.
    #[serde(default)]
    pub api_version: Option<String>,
    /// Defaults to `GameServer`.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub metadata: GameServerMetadataInput,
    #[serde(default)]
    pub spec: GameServerSpec,
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListGameServersQuery {
    /// Namespace to list; `all` lists every namespace. Defaults to `default`.
    pub namespace: Option<String>,
}
