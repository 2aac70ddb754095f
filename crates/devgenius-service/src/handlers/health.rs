//! Health check handlers.

use serde::Serialize;

use crate::extract::Json;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "devgenius".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
