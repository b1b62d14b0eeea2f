//! Configuration management

use std::net::SocketAddr;

use anyhow::{self, Context, Result};

/// Sender address used when `FROM_EMAIL` is not set.
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@adityauniyal.dev";

/// Relay endpoint the form client posts to when `RELAY_URL` is not set.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:8888/relay/send-feedback";

/// Which transport delivers the composed email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    SendGrid,
    Resend,
    /// Writes the email to the log instead of sending it
    Log,
}

impl EmailBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sendgrid" => Some(Self::SendGrid),
            "resend" => Some(Self::Resend),
            "log" => Some(Self::Log),
            _ => None,
        }
    }

    /// Environment variable holding this backend's API key, if it needs one.
    pub fn credential_var(self) -> Option<&'static str> {
        match self {
            Self::SendGrid => Some("SENDGRID_API_KEY"),
            Self::Resend => Some("RESEND_API_KEY"),
            Self::Log => None,
        }
    }
}

/// Mail delivery settings
///
/// `to_email` and `api_key` stay optional here. The relay checks them on
/// every request and answers with a configuration error when they are
/// missing, so the server still starts and reports the problem to callers.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend: EmailBackend,

    /// Sender address
    pub from_email: String,

    /// Where feedback is delivered
    pub to_email: Option<String>,

    /// Provider credential for `backend`
    pub api_key: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the relay server listens on
    pub bind_addr: SocketAddr,

    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, like a blank secret in a hosting dashboard.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("RELAY_BIND")
            .unwrap_or_else(|| "0.0.0.0:8888".to_string())
            .parse::<SocketAddr>()
            .context("RELAY_BIND must be a socket address such as 0.0.0.0:8888")?;

        let backend = match get("EMAIL_BACKEND") {
            Some(value) => EmailBackend::parse(&value).ok_or_else(|| {
                anyhow::anyhow!("Unknown EMAIL_BACKEND '{}' (expected sendgrid, resend or log)", value)
            })?,
            None => EmailBackend::SendGrid,
        };

        let from_email = get("FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string());
        let to_email = get("TO_EMAIL");
        let api_key = backend.credential_var().and_then(|var| get(var));

        if to_email.is_none() {
            tracing::warn!("TO_EMAIL is not set; feedback requests will be refused");
        }
        if let (Some(var), None) = (backend.credential_var(), &api_key) {
            tracing::warn!("{} is not set; feedback requests will be refused", var);
        }

        Ok(Self {
            bind_addr,
            mail: MailConfig {
                backend,
                from_email,
                to_email,
                api_key,
            },
        })
    }
}
