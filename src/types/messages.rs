//! Relay response bodies

use serde::{Deserialize, Serialize};

/// Body returned when the email went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentResponse {
    pub ok: bool,
    pub message: String,
}

impl SentResponse {
    pub fn email_sent() -> Self {
        Self {
            ok: true,
            message: "Email sent".to_string(),
        }
    }
}

/// Body returned on every failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Health check reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongResponse {
    pub message: String,
    pub timestamp: String,
}
