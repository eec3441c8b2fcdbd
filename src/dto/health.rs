use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Health payload returned by the `/api/v1/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 time at which the response was produced.
    pub timestamp: String,
    /// Version of the running API build.
    pub version: String,
}

impl HealthResponse {
    /// Create a health response stamped with the given time.
    pub fn healthy_at(now: SystemTime) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: format_system_time(now),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
