//! Relay failure categories and their JSON responses

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::ErrorBody;

/// Failure categories of the relay. The `Display` text is exactly what the
/// caller sees; underlying causes stay in the logs.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Server not configured. Contact admin.")]
    NotConfigured,

    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    /// Body could not be read, e.g. it exceeds the size limit.
    #[error("Invalid JSON")]
    UnreadableBody(#[source] BytesRejection),

    #[error("Missing rating or message")]
    MissingFields,

    #[error("Failed to send email")]
    Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NotConfigured | RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UnreadableBody(rejection) => rejection.status(),
            RelayError::InvalidJson(_) | RelayError::MissingFields => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
