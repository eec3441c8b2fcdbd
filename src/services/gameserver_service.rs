//! CRUD operations over `GameServer` claims.

use tracing::{debug, info};
use validator::Validate;

use crate::{
    cluster::{ClusterError, NamespaceScope},
    dto::{
        common::MessageResponse,
        gameserver::{CreateGameServerRequest, GameServer, GameServerList, GameServerSpec},
    },
    error::ServiceError,
    resource::{self, API_VERSION, KIND, SUPPORTED_GAME_TYPES},
    state::SharedState,
};

/// Namespace value that lists claims across the whole cluster.
pub const ALL_NAMESPACES: &str = "all";

const NOT_FOUND: &str = "GameServer not found";

/// List claims of one namespace, or of every namespace for [`ALL_NAMESPACES`].
pub async fn list_game_servers(
    state: &SharedState,
    namespace: Option<&str>,
) -> Result<GameServerList, ServiceError> {
    let namespace = state.namespace_or_default(namespace);
    let scope = if namespace == ALL_NAMESPACES {
        NamespaceScope::All
    } else {
        NamespaceScope::Namespace(namespace)
    };

    let objects = state
        .cluster()
        .list_game_servers(scope)
        .await
        .map_err(upstream("Failed to list GameServers"))?;

    let items: Vec<GameServer> = objects.iter().map(resource::to_game_server).collect();
    Ok(GameServerList {
        total: items.len(),
        items,
    })
}

/// Validate and create a new claim.
pub async fn create_game_server(
    state: &SharedState,
    mut request: CreateGameServerRequest,
) -> Result<GameServer, ServiceError> {
    ensure_type_meta(&request)?;

    if request.metadata.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("metadata.name is required".into()));
    }
    ensure_game_type(&request.spec)?;

    if request
        .metadata
        .namespace
        .as_deref()
        .is_some_and(|ns| ns.trim().is_empty())
    {
        request.metadata.namespace = None;
    }
    request.validate()?;

    let name = request.metadata.name.as_str();
    let namespace = state.namespace_or_default(request.metadata.namespace.as_deref());
    let object = resource::new_game_server(
        name,
        &namespace,
        &request.spec,
        request.metadata.labels.as_ref(),
    );

    let created = state
        .cluster()
        .create_game_server(object)
        .await
        .map_err(upstream("Failed to create GameServer"))?;

    info!(
        %namespace,
        %name,
        game_type = %request.spec.game_type,
        "created game server"
    );
    Ok(resource::to_game_server(&created))
}

/// Fetch one claim.
pub async fn get_game_server(
    state: &SharedState,
    namespace: &str,
    name: &str,
) -> Result<GameServer, ServiceError> {
    let object = state
        .cluster()
        .get_game_server(namespace, name)
        .await
        .map_err(lookup("Failed to get GameServer"))?;
    Ok(resource::to_game_server(&object))
}

/// Replace the user-facing spec of an existing claim.
pub async fn update_game_server(
    state: &SharedState,
    namespace: &str,
    name: &str,
    spec: GameServerSpec,
) -> Result<GameServer, ServiceError> {
    ensure_game_type(&spec)?;

    let mut object = state
        .cluster()
        .get_game_server(namespace, name)
        .await
        .map_err(lookup("Failed to get GameServer"))?;

    resource::apply_spec(&mut object, &spec);

    let updated = state
        .cluster()
        .replace_game_server(object)
        .await
        .map_err(lookup("Failed to update GameServer"))?;

    info!(%namespace, %name, game_type = %spec.game_type, "updated game server");
    Ok(resource::to_game_server(&updated))
}

/// Delete a claim; the composition engine tears down its workload.
pub async fn delete_game_server(
    state: &SharedState,
    namespace: &str,
    name: &str,
) -> Result<MessageResponse, ServiceError> {
    state
        .cluster()
        .delete_game_server(namespace, name)
        .await
        .map_err(lookup("Failed to delete GameServer"))?;

    info!(%namespace, %name, "deleted game server");
    Ok(MessageResponse::new("GameServer deleted successfully"))
}

fn ensure_type_meta(request: &CreateGameServerRequest) -> Result<(), ServiceError> {
    let mismatch = |given: &Option<String>, expected: &str| {
        given
            .as_deref()
            .is_some_and(|value| !value.is_empty() && value != expected)
    };

    if mismatch(&request.api_version, API_VERSION) {
        return Err(ServiceError::InvalidInput(format!(
            "apiVersion must be {API_VERSION}"
        )));
    }
    if mismatch(&request.kind, KIND) {
        return Err(ServiceError::InvalidInput(format!("kind must be {KIND}")));
    }
    Ok(())
}

pub(crate) fn ensure_game_type(spec: &GameServerSpec) -> Result<(), ServiceError> {
    let game_type = spec.game_type.as_str();
    if game_type.is_empty() {
        return Err(ServiceError::InvalidInput("spec.gameType is required".into()));
    }
    if !resource::is_supported_game_type(game_type) {
        return Err(ServiceError::InvalidInput(format!(
            "Unsupported game type: {game_type}. Valid types: {}",
            SUPPORTED_GAME_TYPES.join(", ")
        )));
    }
    Ok(())
}

/// Keep client-facing failures as they are and prefix the rest with `action`.
fn upstream(action: &'static str) -> impl FnOnce(ClusterError) -> ServiceError {
    move |err| match err {
        ClusterError::NotFound(_)
        | ClusterError::Conflict(_)
        | ClusterError::Invalid(_)
        | ClusterError::Forbidden(_) => err.into(),
        other => {
            debug!(error = %other, action, "kubernetes call failed");
            ServiceError::Upstream(format!("{action}: {other}"))
        }
    }
}

/// Like [`upstream`], but a missing object reads as "GameServer not found".
fn lookup(action: &'static str) -> impl FnOnce(ClusterError) -> ServiceError {
    move |err| {
        if err.is_not_found() {
            ServiceError::NotFound(NOT_FOUND.into())
        } else {
            upstream(action)(err)
        }
    }
}
