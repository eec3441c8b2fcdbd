use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::{config::AppConfig, state::SharedState};

/// Static assets under `/static` and the admin UI entry page for every other
/// unmatched path, so client-side routes resolve on reload.
pub fn router(config: &AppConfig) -> Router<SharedState> {
    let index = ServeFile::new(config.index_file());

    Router::new()
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .route_service("/", index.clone())
        .fallback_service(index)
}
