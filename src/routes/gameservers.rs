use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        common::{ErrorResponse, MessageResponse},
        gameserver::{
            CreateGameServerRequest, GameServer, GameServerList, GameServerSpec,
            ListGameServersQuery,
        },
        pod::{LogsQuery, LogsResponse, MetricsResponse, MissingWorkloadResponse, RestartResponse},
    },
    error::AppError,
    services::{gameserver_service, pod_service},
    state::SharedState,
};

/// GameServer CRUD plus the pod actions nested under each server.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/v1/gameservers",
            get(list_game_servers).post(create_game_server),
        )
        .route(
            "/api/v1/gameservers/{namespace}/{name}",
            get(get_game_server)
                .put(update_game_server)
                .delete(delete_game_server),
        )
        .route(
            "/api/v1/gameservers/{namespace}/{name}/logs",
            get(game_server_logs),
        )
        .route(
            "/api/v1/gameservers/{namespace}/{name}/restart",
            post(restart_game_server),
        )
        .route(
            "/api/v1/gameservers/{namespace}/{name}/metrics",
            get(game_server_metrics),
        )
}

/// List game servers of a namespace, or of all namespaces with `namespace=all`.
#[utoipa::path(
    get,
    path = "/api/v1/gameservers",
    tag = "gameservers",
    params(ListGameServersQuery),
    responses(
        (status = 200, description = "Game servers in scope", body = GameServerList),
        (status = 500, description = "Kubernetes API failure", body = ErrorResponse)
    )
)]
pub async fn list_game_servers(
    State(state): State<SharedState>,
    Query(query): Query<ListGameServersQuery>,
) -> Result<Json<GameServerList>, AppError> {
    Ok(Json(
        gameserver_service::list_game_servers(&state, query.namespace.as_deref()).await?,
    ))
}

/// Create a game server claim.
#[utoipa::path(
    post,
    path = "/api/v1/gameservers",
    tag = "gameservers",
    request_body = CreateGameServerRequest,
    responses(
        (status = 201, description = "Game server created", body = GameServer),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    )
)]
pub async fn create_game_server(
    State(state): State<SharedState>,
    payload: Result<Json<CreateGameServerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameServer>), AppError> {
    let Json(payload) = payload?;
    let created = gameserver_service::create_game_server(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Retrieve one game server.
#[utoipa::path(
    get,
    path = "/api/v1/gameservers/{namespace}/{name}",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim")
    ),
    responses(
        (status = 200, description = "Game server", body = GameServer),
        (status = 404, description = "Unknown game server", body = ErrorResponse)
    )
)]
pub async fn get_game_server(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<GameServer>, AppError> {
    Ok(Json(
        gameserver_service::get_game_server(&state, &namespace, &name).await?,
    ))
}

/// Replace the spec of an existing game server.
#[utoipa::path(
    put,
    path = "/api/v1/gameservers/{namespace}/{name}",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim")
    ),
    request_body = GameServerSpec,
    responses(
        (status = 200, description = "Game server updated", body = GameServer),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Unknown game server", body = ErrorResponse)
    )
)]
pub async fn update_game_server(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
    payload: Result<Json<GameServerSpec>, JsonRejection>,
) -> Result<Json<GameServer>, AppError> {
    let Json(spec) = payload?;
    Ok(Json(
        gameserver_service::update_game_server(&state, &namespace, &name, spec).await?,
    ))
}

/// Delete a game server.
#[utoipa::path(
    delete,
    path = "/api/v1/gameservers/{namespace}/{name}",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim")
    ),
    responses(
        (status = 200, description = "Game server deleted", body = MessageResponse),
        (status = 404, description = "Unknown game server", body = ErrorResponse)
    )
)]
pub async fn delete_game_server(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(
        gameserver_service::delete_game_server(&state, &namespace, &name).await?,
    ))
}

/// Tail the logs of the game server pod.
#[utoipa::path(
    get,
    path = "/api/v1/gameservers/{namespace}/{name}/logs",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim"),
        LogsQuery
    ),
    responses(
        (status = 200, description = "Pod logs", body = LogsResponse),
        (status = 404, description = "No pod runs the game server", body = ErrorResponse)
    )
)]
pub async fn game_server_logs(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, AppError> {
    Ok(Json(
        pod_service::pod_logs(&state, &namespace, &name, query.tail_lines()).await?,
    ))
}

/// Restart the game server by deleting its pod.
#[utoipa::path(
    post,
    path = "/api/v1/gameservers/{namespace}/{name}/restart",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim")
    ),
    responses(
        (status = 200, description = "Pod deleted", body = RestartResponse),
        (status = 404, description = "No pod runs the game server", body = ErrorResponse)
    )
)]
pub async fn restart_game_server(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<RestartResponse>, AppError> {
    Ok(Json(
        pod_service::restart_game_server(&state, &namespace, &name).await?,
    ))
}

/// Live CPU and memory usage compared to the configured resources.
#[utoipa::path(
    get,
    path = "/api/v1/gameservers/{namespace}/{name}/metrics",
    tag = "gameservers",
    params(
        ("namespace" = String, Path, description = "Namespace of the claim"),
        ("name" = String, Path, description = "Name of the claim")
    ),
    responses(
        (status = 200, description = "Usage, possibly marked metrics_unavailable", body = MetricsResponse),
        (status = 404, description = "Claim unknown, not bound yet, or without workload pod; the latter adds the searched location", body = MissingWorkloadResponse)
    )
)]
pub async fn game_server_metrics(
    State(state): State<SharedState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<MetricsResponse>, AppError> {
    Ok(Json(
        pod_service::game_server_metrics(&state, &namespace, &name).await?,
    ))
}
