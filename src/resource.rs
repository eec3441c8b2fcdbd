//! Mapping between the dynamic `GameServer` object stored in the cluster and
//! the typed DTOs served over HTTP.
//!
//! The custom resource schema belongs to the composition engine, so the stored
//! object is handled as untyped JSON. Reading is lenient: missing fields or
//! fields with an unexpected JSON type are skipped rather than reported.

use std::collections::BTreeMap;

use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use serde_json::{Map, Value};

use crate::dto::gameserver::{
    GameServer, GameServerAdvanced, GameServerCondition, GameServerMetadata,
    GameServerNetworking, GameServerResources, GameServerSpec, GameServerStatus,
};

pub const GROUP: &str = "gameplane.kubelize.io";
pub const VERSION: &str = "v1alpha1";
pub const API_VERSION: &str = "gameplane.kubelize.io/v1alpha1";
pub const KIND: &str = "GameServer";
pub const PLURAL: &str = "gameservers";

/// Game types the composition knows how to route.
pub const SUPPORTED_GAME_TYPES: &[&str] = &["sdtd", "ce", "pw", "vh", "we", "ln"];

pub const NAME_LABEL: &str = "app.kubernetes.io/name";
pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";
pub const GAME_TYPE_LABEL: &str = "gameplane.kubelize.io/game-type";
/// Label carried by the pods of the composed workload.
pub const WORKLOAD_LABEL: &str = "kubelize.io/gameserver";

/// Spec keys written by this API. Anything else under `spec` belongs to the
/// composition engine (`resourceRef`, `compositionRef`, ...) and is preserved.
const OWNED_SPEC_KEYS: &[&str] = &[
    "gameType",
    "serverName",
    "serverDescription",
    "resources",
    "networking",
    "gameConfig",
    "advanced",
];

/// Dynamic API descriptor for `gameservers.gameplane.kubelize.io`.
pub fn api_resource() -> ApiResource {
    ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk(GROUP, VERSION, KIND), PLURAL)
}

pub fn is_supported_game_type(game_type: &str) -> bool {
    SUPPORTED_GAME_TYPES.contains(&game_type)
}

/// Label selector matching the pods of a claim in its own namespace.
pub fn instance_selector(name: &str) -> String {
    format!("{INSTANCE_LABEL}={name}")
}

/// Location of the workload composed for a claim.
///
/// The composition names both the target namespace and the pod label value
/// `<resourceRef.name>-<gameType>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub resource_ref_name: String,
    pub game_type: String,
}

impl WorkloadRef {
    pub fn namespace(&self) -> String {
        format!("{}-{}", self.resource_ref_name, self.game_type)
    }

    pub fn selector(&self) -> String {
        format!("{WORKLOAD_LABEL}={}", self.namespace())
    }
}

/// Resource amounts configured in the claim spec, empty when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredResources {
    pub cpu: String,
    pub memory: String,
}

/// Render the `spec` object sent to the cluster, leaving out unset fields.
pub fn build_spec(spec: &GameServerSpec) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("gameType".into(), Value::String(spec.game_type.clone()));
    insert_text(&mut out, "serverName", &spec.server_name);
    insert_text(&mut out, "serverDescription", &spec.server_description);

    if let Some(resources) = &spec.resources {
        let sized = [&resources.cpu, &resources.memory, &resources.storage_size]
            .into_iter()
            .any(|field| present(field).is_some());
        if sized {
            let mut block = Map::new();
            insert_text(&mut block, "cpu", &resources.cpu);
            insert_text(&mut block, "memory", &resources.memory);
            insert_text(&mut block, "storageSize", &resources.storage_size);
            insert_text(&mut block, "storageClass", &resources.storage_class);
            out.insert("resources".into(), Value::Object(block));
        }
    }

    if let Some(networking) = &spec.networking {
        let mut block = Map::new();
        insert_text(&mut block, "serviceType", &networking.service_type);
        if networking.enable_ingress == Some(true) {
            block.insert("enableIngress".into(), Value::Bool(true));
        }
        insert_text(&mut block, "ingressHost", &networking.ingress_host);
        if !block.is_empty() {
            out.insert("networking".into(), Value::Object(block));
        }
    }

    if let Some(config) = spec.game_config.as_ref().filter(|config| !config.is_empty()) {
        let config = config
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        out.insert("gameConfig".into(), Value::Object(config));
    }

    if let Some(advanced) = &spec.advanced {
        let mut block = Map::new();
        if let Some(affinity) = &advanced.affinity {
            block.insert("affinity".into(), Value::Object(affinity.clone()));
        }
        if let Some(tolerations) = advanced.tolerations.as_ref().filter(|t| !t.is_empty()) {
            let tolerations = tolerations.iter().cloned().map(Value::Object).collect();
            block.insert("tolerations".into(), Value::Array(tolerations));
        }
        if let Some(vars) = advanced.custom_env_vars.as_ref().filter(|v| !v.is_empty()) {
            let vars = vars
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect();
            block.insert("customEnvVars".into(), Value::Object(vars));
        }
        if !block.is_empty() {
            out.insert("advanced".into(), Value::Object(block));
        }
    }

    out
}

/// Default labels of a claim; `extra` entries override them.
pub fn claim_labels(
    name: &str,
    game_type: &str,
    extra: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from([
        (NAME_LABEL.to_string(), "gameserver".to_string()),
        (INSTANCE_LABEL.to_string(), name.to_string()),
        (GAME_TYPE_LABEL.to_string(), game_type.to_string()),
    ]);
    if let Some(extra) = extra {
        labels.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    labels
}

/// Build a new claim object ready to be created.
pub fn new_game_server(
    name: &str,
    namespace: &str,
    spec: &GameServerSpec,
    extra_labels: Option<&BTreeMap<String, String>>,
) -> DynamicObject {
    let mut object = DynamicObject::new(name, &api_resource()).within(namespace);
    object.metadata.labels = Some(claim_labels(name, &spec.game_type, extra_labels));
    object.data = Value::Object(Map::from_iter([(
        "spec".to_string(),
        Value::Object(build_spec(spec)),
    )]));
    object
}

/// Replace the user-facing part of an existing claim spec.
///
/// Keys managed by the composition engine survive the update, and the
/// game-type label follows the new game type.
pub fn apply_spec(object: &mut DynamicObject, spec: &GameServerSpec) {
    if !object.data.is_object() {
        object.data = Value::Object(Map::new());
    }

    if let Value::Object(data) = &mut object.data {
        let mut merged = match data.remove("spec") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        merged.retain(|key, _| !OWNED_SPEC_KEYS.contains(&key.as_str()));
        merged.extend(build_spec(spec));
        data.insert("spec".into(), Value::Object(merged));
    }

    object
        .metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(GAME_TYPE_LABEL.to_string(), spec.game_type.clone());
}

/// Workload reference of a claim, available once the composite is bound.
pub fn workload_ref(object: &DynamicObject) -> Option<WorkloadRef> {
    let spec = object_field(&object.data, "spec")?;
    let resource_ref_name = object_field(spec, "resourceRef")
        .and_then(|reference| text_field(reference, "name"))
        .filter(|name| !name.is_empty())?;

    Some(WorkloadRef {
        resource_ref_name,
        game_type: text_field(spec, "gameType").unwrap_or_default(),
    })
}

/// `spec.gameType` of a claim, empty when unset.
pub fn game_type(object: &DynamicObject) -> String {
    object_field(&object.data, "spec")
        .and_then(|spec| text_field(spec, "gameType"))
        .unwrap_or_default()
}

/// `spec.resources.cpu` and `spec.resources.memory` of a claim.
pub fn configured_resources(object: &DynamicObject) -> ConfiguredResources {
    let resources = object_field(&object.data, "spec")
        .and_then(|spec| object_field(spec, "resources"));
    ConfiguredResources {
        cpu: resources
            .and_then(|r| text_field(r, "cpu"))
            .unwrap_or_default(),
        memory: resources
            .and_then(|r| text_field(r, "memory"))
            .unwrap_or_default(),
    }
}

/// Convert a stored claim into its typed representation.
pub fn to_game_server(object: &DynamicObject) -> GameServer {
    let (api_version, kind) = object
        .types
        .as_ref()
        .map(|types| (types.api_version.clone(), types.kind.clone()))
        .unwrap_or_else(|| (API_VERSION.to_string(), KIND.to_string()));

    let meta = &object.metadata;
    let metadata = GameServerMetadata {
        name: meta.name.clone().unwrap_or_default(),
        namespace: meta.namespace.clone(),
        creation_timestamp: meta
            .creation_timestamp
            .as_ref()
            .and_then(|time| serde_json::to_value(time).ok())
            .and_then(|value| value.as_str().map(str::to_owned)),
        labels: meta.labels.clone(),
        annotations: meta.annotations.clone(),
    };

    GameServer {
        api_version,
        kind,
        metadata,
        spec: object_field(&object.data, "spec")
            .map(read_spec)
            .unwrap_or_default(),
        status: object_field(&object.data, "status")
            .map(read_status)
            .unwrap_or_default(),
    }
}

fn read_spec(spec: &Map<String, Value>) -> GameServerSpec {
    let resources = object_field(spec, "resources").map(|r| GameServerResources {
        cpu: text_field(r, "cpu"),
        memory: text_field(r, "memory"),
        storage_size: text_field(r, "storageSize"),
        storage_class: text_field(r, "storageClass"),
    });

    let networking = object_field(spec, "networking").map(|n| GameServerNetworking {
        service_type: text_field(n, "serviceType"),
        enable_ingress: n.get("enableIngress").and_then(Value::as_bool),
        ingress_host: text_field(n, "ingressHost"),
    });

    let game_config = object_field(spec, "gameConfig").map(|config| {
        config
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    });

    let advanced = object_field(spec, "advanced").map(|a| GameServerAdvanced {
        affinity: object_field(a, "affinity").cloned(),
        tolerations: a.get("tolerations").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .cloned()
                .collect()
        }),
        custom_env_vars: object_field(a, "customEnvVars").map(|vars| {
            vars.iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect()
        }),
    });

    GameServerSpec {
        game_type: text_field(spec, "gameType").unwrap_or_default(),
        server_name: text_field(spec, "serverName"),
        server_description: text_field(spec, "serverDescription"),
        resources,
        networking,
        game_config,
        advanced,
    }
}

fn read_status(status: &Map<String, Value>) -> GameServerStatus {
    let conditions = status
        .get("conditions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|c| GameServerCondition {
                    type_: text_field(c, "type"),
                    status: text_field(c, "status"),
                    reason: text_field(c, "reason"),
                    message: text_field(c, "message"),
                    last_transition_time: text_field(c, "lastTransitionTime"),
                })
                .collect()
        });

    GameServerStatus {
        phase: text_field(status, "phase"),
        child_type: text_field(status, "childType"),
        child_name: text_field(status, "childName"),
        server_ip: text_field(status, "serverIP"),
        game_port: status.get("gamePort").and_then(Value::as_i64),
        web_port: status.get("webPort").and_then(Value::as_i64),
        server_endpoint: text_field(status, "serverEndpoint"),
        players_online: status.get("playersOnline").and_then(Value::as_i64),
        last_update: text_field(status, "lastUpdate"),
        conditions,
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn insert_text(target: &mut Map<String, Value>, key: &str, field: &Option<String>) {
    if let Some(value) = present(field) {
        target.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn object_field<'a, C>(container: &'a C, key: &str) -> Option<&'a Map<String, Value>>
where
    C: FieldSource + ?Sized,
{
    container.field(key).and_then(Value::as_object)
}

fn text_field<C>(container: &C, key: &str) -> Option<String>
where
    C: FieldSource + ?Sized,
{
    container
        .field(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Keyed lookup over both raw JSON values and JSON objects.
trait FieldSource {
    fn field(&self, key: &str) -> Option<&Value>;
}

impl FieldSource for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl FieldSource for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}
