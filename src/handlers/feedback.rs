//! Feedback relay endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::error::RelayError;
use crate::services::relay::Relay;

/// Largest feedback body the relay reads.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// POST /relay/send-feedback
///
/// Takes the raw body so malformed JSON and oversized bodies are answered
/// with the relay's own error shape instead of axum's rejection text.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn send_feedback(
    State(relay): State<Arc<Relay>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            // Configuration problems still take precedence over input problems.
            let err = match relay.ensure_configured() {
                Err(e) => e,
                Ok(()) => {
                    tracing::warn!("Unreadable feedback body: {}", rejection);
                    RelayError::UnreadableBody(rejection)
                }
            };
            return err.into_response();
        }
    };

    match relay.relay(&body).await {
        Ok(sent) => (StatusCode::OK, Json(sent)).into_response(),
        Err(e) => e.into_response(),
    }
}
