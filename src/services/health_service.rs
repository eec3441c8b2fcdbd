use std::time::SystemTime;

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
///
/// The payload reports liveness only: an unreachable API server is logged but
/// never turns the answer unhealthy.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if let Err(err) = state.cluster().ping().await {
        warn!(error = %err, "kubernetes api server unreachable");
    }

    HealthResponse::healthy_at(SystemTime::now())
}
