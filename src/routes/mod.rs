use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::state::SharedState;

pub mod cluster;
pub mod docs;
pub mod gameservers;
pub mod health;
pub mod ui;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(gameservers::router())
        .merge(cluster::router());

    let ui_router = ui::router(state.config());

    api_router
        .merge(docs::router())
        .merge(ui_router)
        .with_state(state)
}

/// CORS policy for the browser-based admin UI.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        cluster::fake::{FakeCluster, FakePod},
        config::AppConfig,
        dto::gameserver::GameServerSpec,
        resource::{self, INSTANCE_LABEL},
        state::AppState,
    };

    fn app_with(cluster: FakeCluster, config: AppConfig) -> Router {
        router(AppState::new(Arc::new(cluster), config))
    }

    fn app(cluster: FakeCluster) -> Router {
        app_with(cluster, AppConfig::default())
    }

    fn stored(name: &str, game_type: &str) -> kube::api::DynamicObject {
        let spec = GameServerSpec {
            game_type: game_type.into(),
            ..GameServerSpec::default()
        };
        resource::new_game_server(name, "default", &spec, None)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = send(app(FakeCluster::new()), "GET", "/api/v1/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn list_returns_items_and_total() {
        let cluster = FakeCluster::new()
            .with_game_server(stored("valheim", "vh"))
            .with_game_server(stored("palworld", "pw"));
        let response = send(app(cluster), "GET", "/api/v1/gameservers", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"][0]["apiVersion"], resource::API_VERSION);
        assert_eq!(body["items"][0]["metadata"]["namespace"], "default");
    }

    #[tokio::test]
    async fn create_returns_created_resource() {
        let payload = json!({
            "metadata": { "name": "valheim", "namespace": "games" },
            "spec": { "gameType": "vh", "resources": { "cpu": "2", "memory": "4Gi" } }
        });
        let response = send(
            app(FakeCluster::new()),
            "POST",
            "/api/v1/gameservers",
            Some(&payload.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "GameServer");
        assert_eq!(body["metadata"]["namespace"], "games");
        assert_eq!(body["spec"]["resources"]["memory"], "4Gi");
    }

    #[tokio::test]
    async fn create_rejects_malformed_and_invalid_bodies() {
        let response = send(app(FakeCluster::new()), "POST", "/api/v1/gameservers", Some("{oops")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body: "));

        let payload = json!({ "metadata": { "name": "valheim" }, "spec": { "gameType": "mc" } });
        let response = send(
            app(FakeCluster::new()),
            "POST",
            "/api/v1/gameservers",
            Some(&payload.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Unsupported game type: mc. Valid types: sdtd, ce, pw, vh, we, ln" })
        );
    }

    #[tokio::test]
    async fn get_update_delete_round_trip() {
        let cluster = FakeCluster::new().with_game_server(stored("valheim", "vh"));
        let app = app(cluster);

        let response = send(app.clone(), "GET", "/api/v1/gameservers/default/valheim", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let spec = json!({ "gameType": "we", "serverName": "Enshrouded" });
        let response = send(
            app.clone(),
            "PUT",
            "/api/v1/gameservers/default/valheim",
            Some(&spec.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["spec"]["serverName"], "Enshrouded");

        let response = send(app.clone(), "DELETE", "/api/v1/gameservers/default/valheim", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "GameServer deleted successfully" })
        );

        let response = send(app, "GET", "/api/v1/gameservers/default/valheim", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "GameServer not found" }));
    }

    #[tokio::test]
    async fn logs_fall_back_to_default_line_count() {
        let cluster = FakeCluster::new()
            .with_pod(FakePod::new("default", "valheim-0", &[(INSTANCE_LABEL, "valheim")]).with_logs("ready"));
        let response = send(
            app(cluster),
            "GET",
            "/api/v1/gameservers/default/valheim/logs?lines=abc",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "logs": "ready", "pod": "valheim-0" })
        );
    }

    #[tokio::test]
    async fn restart_without_pods_is_not_found() {
        let response = send(
            app(FakeCluster::new()),
            "POST",
            "/api/v1/gameservers/default/valheim/restart",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "No pods found for GameServer" })
        );
    }

    #[tokio::test]
    async fn metrics_without_workload_pod_carry_location() {
        let mut claim = stored("valheim", "vh");
        claim.data["spec"]["resourceRef"] = json!({ "name": "valheim-x7k2p" });
        let response = send(
            app(FakeCluster::new().with_game_server(claim)),
            "GET",
            "/api/v1/gameservers/default/valheim/metrics",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["actualNamespace"], "valheim-x7k2p-vh");
        assert_eq!(body["resourceRefName"], "valheim-x7k2p");
        assert_eq!(body["gameType"], "vh");
        assert_eq!(body["claimName"], "valheim");
    }

    #[tokio::test]
    async fn cluster_routes() {
        let cluster = FakeCluster::new()
            .with_namespaces(&["default"])
            .with_version("v1.31.2", "linux/arm64", 2);
        let app = app(cluster);

        let response = send(app.clone(), "GET", "/api/v1/namespaces", None).await;
        assert_eq!(json_body(response).await, json!({ "namespaces": ["default"] }));

        let response = send(app, "GET", "/api/v1/cluster/info", None).await;
        assert_eq!(
            json_body(response).await,
            json!({ "version": "v1.31.2", "nodeCount": 2, "platform": "linux/arm64" })
        );

        let response = send(
            app_with(FakeCluster::new().unreachable(), AppConfig::default()),
            "GET",
            "/api/v1/namespaces",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Failed to list namespaces" })
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = send(app(FakeCluster::new()), "GET", "/api-doc/openapi.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"]["/api/v1/gameservers"].is_object());
    }

    #[tokio::test]
    async fn unknown_paths_serve_the_ui_index() {
        let root = std::env::temp_dir().join(format!("gameplane-ui-{}", std::process::id()));
        let public = root.join("public");
        let assets = root.join("static");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(public.join("index.html"), "<h1>GamePlane</h1>").unwrap();
        std::fs::write(assets.join("app.js"), "console.log('ok');").unwrap();

        let config = AppConfig {
            public_dir: public.clone(),
            static_dir: PathBuf::from(&assets),
            ..AppConfig::default()
        };

        for uri in ["/", "/servers/valheim"] {
            let response = send(app_with(FakeCluster::new(), config.clone()), "GET", uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], b"<h1>GamePlane</h1>");
        }

        let response = send(app_with(FakeCluster::new(), config.clone()), "GET", "/static/app.js", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(app_with(FakeCluster::new(), config), "GET", "/static/missing.js", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn cors_allows_configured_origins_only() {
        let origins = vec!["http://localhost:3000".to_string(), "bad\norigin".to_string()];
        let app = app(FakeCluster::new()).layer(cors_layer(&origins));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        let request = Request::builder()
            .uri("/api/v1/health")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
