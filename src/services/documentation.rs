use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the GamePlane API.
#[openapi(
    info(title = "GamePlane API", description = "Manage GameServer resources on Kubernetes"),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::gameservers::list_game_servers,
        crate::routes::gameservers::create_game_server,
        crate::routes::gameservers::get_game_server,
        crate::routes::gameservers::update_game_server,
        crate::routes::gameservers::delete_game_server,
        crate::routes::gameservers::game_server_logs,
        crate::routes::gameservers::restart_game_server,
        crate::routes::gameservers::game_server_metrics,
        crate::routes::cluster::list_namespaces,
        crate::routes::cluster::cluster_info,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::MessageResponse,
            crate::dto::common::ErrorResponse,
            crate::dto::gameserver::GameServer,
            crate::dto::gameserver::GameServerList,
            crate::dto::gameserver::GameServerSpec,
            crate::dto::gameserver::GameServerStatus,
            crate::dto::gameserver::CreateGameServerRequest,
            crate::dto::pod::LogsResponse,
            crate::dto::pod::RestartResponse,
            crate::dto::pod::MetricsResponse,
            crate::dto::pod::MissingWorkloadResponse,
            crate::dto::cluster::NamespaceList,
            crate::dto::cluster::ClusterInfo,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "gameservers", description = "GameServer lifecycle and pod actions"),
        (name = "cluster", description = "Cluster-wide queries"),
    )
)]
pub struct ApiDoc;
