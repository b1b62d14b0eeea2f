//! Ping handler for health checks

use axum::{extract::Query, Json};
use serde::Deserialize;
use tracing::debug;

use crate::types::PongResponse;

#[derive(Debug, Deserialize)]
pub struct PingRequest {
    #[serde(default)]
    message: Option<String>,
}

/// GET /relay/ping
pub async fn handle_ping(Query(request): Query<PingRequest>) -> Json<PongResponse> {
    debug!("Received ping");

    Json(PongResponse {
        message: request
            .message
            .map(|m| format!("Pong: {}", m))
            .unwrap_or_else(|| "Pong".to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
