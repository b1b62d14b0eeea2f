//! Transactional email sending abstraction.
//!
//! `EmailSender` is the core trait. `SendGridEmailSender` and
//! `ResendEmailSender` talk to live providers, `LogEmailSender` logs to
//! tracing in dev, `FakeEmailSender` records messages in tests.
//!
//! The trait is object-safe so callers can hold `Arc<dyn EmailSender>`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{info, warn};

use crate::config::{EmailBackend, MailConfig};

// =============================================================================
// Core trait
// =============================================================================

/// Represents a rendered email message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

/// Abstraction over an email transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, msg: EmailMessage) -> Result<()>;
}

/// Build the sender for the configured backend.
///
/// Returns `None` when the backend needs an API key and none is configured.
pub fn create_email_sender(config: &MailConfig) -> Option<Arc<dyn EmailSender>> {
    match (config.backend, config.api_key.as_deref()) {
        (EmailBackend::Log, _) => {
            info!("Using LogEmailSender");
            Some(Arc::new(LogEmailSender))
        }
        (EmailBackend::SendGrid, Some(key)) => {
            info!("Using SendGridEmailSender");
            Some(Arc::new(SendGridEmailSender::new(key)))
        }
        (EmailBackend::Resend, Some(key)) => {
            info!("Using ResendEmailSender");
            Some(Arc::new(ResendEmailSender::new(key)))
        }
        (backend, None) => {
            warn!(?backend, "No API key for email backend, delivery disabled");
            None
        }
    }
}

// =============================================================================
// LogEmailSender — writes to tracing (dev)
// =============================================================================

pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        info!(
            to = %msg.to,
            from = %msg.from,
            subject = %msg.subject,
            "[LogEmailSender] Would send email\n---HTML---\n{}",
            msg.html,
        );
        Ok(())
    }
}

// =============================================================================
// FakeEmailSender — captures sent messages in a Vec (tests)
// =============================================================================

/// Collects sent messages in memory for assertion in tests.
///
/// A sender built with [`FakeEmailSender::failing`] records the attempt and
/// then returns an error, the way a provider rejecting the request would.
#[derive(Default)]
pub struct FakeEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
    failure: Option<String>,
}

impl FakeEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    pub fn last_message(&self) -> Option<EmailMessage> {
        self.sent.lock().last().cloned()
    }

    /// Number of `send` calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl EmailSender for FakeEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        self.sent.lock().push(msg);
        match &self.failure {
            Some(reason) => Err(anyhow::anyhow!("{}", reason)),
            None => Ok(()),
        }
    }
}

// =============================================================================
// SendGridEmailSender — live SendGrid v3 API
// =============================================================================

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridEmailSender {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridEmailSender {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, SENDGRID_URL)
    }

    /// Point the sender at a different API base, e.g. a local mock.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": msg.to }] }],
            "from": { "email": msg.from },
            "subject": msg.subject,
            "content": [{ "type": "text/html", "value": msg.html }],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("SendGrid request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("SendGrid API error {}: {}", status, body));
        }

        info!(to = %msg.to, subject = %msg.subject, "Email sent via SendGrid");
        Ok(())
    }
}

// =============================================================================
// ResendEmailSender — live Resend.com API
// =============================================================================

const RESEND_URL: &str = "https://api.resend.com/emails";

pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendEmailSender {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, RESEND_URL)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        let mut body = HashMap::new();
        body.insert("from", msg.from.as_str());
        body.insert("to", msg.to.as_str());
        body.insert("subject", msg.subject.as_str());
        body.insert("html", msg.html.as_str());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Resend request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Resend API error {}: {}", status, body));
        }

        info!(to = %msg.to, subject = %msg.subject, "Email sent via Resend");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use tokio::net::TcpListener;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "owner@example.com".into(),
            from: "no-reply@example.com".into(),
            subject: "New website feedback".into(),
            html: "<p>Great site</p>".into(),
        }
    }

    fn mail_config(backend: EmailBackend, api_key: Option<&str>) -> MailConfig {
        MailConfig {
            backend,
            from_email: "no-reply@example.com".into(),
            to_email: Some("owner@example.com".into()),
            api_key: api_key.map(str::to_string),
        }
    }

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fake_sender_captures_messages() {
        let sender = FakeEmailSender::new();
        sender.send(message()).await.unwrap();

        let msgs = sender.sent_messages();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].to, "owner@example.com");
        assert_eq!(sender.last_message().unwrap().subject, "New website feedback");
    }

    #[tokio::test]
    async fn failing_fake_sender_records_attempt_and_errors() {
        let sender = FakeEmailSender::failing("quota exceeded");
        let err = sender.send(message()).await.unwrap_err();

        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn log_sender_does_not_error() {
        LogEmailSender.send(message()).await.unwrap();
    }

    #[test]
    fn create_sender_requires_key_for_live_backends() {
        assert!(create_email_sender(&mail_config(EmailBackend::SendGrid, None)).is_none());
        assert!(create_email_sender(&mail_config(EmailBackend::Resend, None)).is_none());
        assert!(create_email_sender(&mail_config(EmailBackend::SendGrid, Some("SG.x"))).is_some());
        assert!(create_email_sender(&mail_config(EmailBackend::Log, None)).is_some());
    }

    #[tokio::test]
    async fn sendgrid_sender_posts_v3_payload() {
        let captured = Arc::new(Mutex::new(None::<(Option<String>, serde_json::Value)>));
        let sink = captured.clone();
        let app = Router::new().route(
            "/v3/mail/send",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *sink.lock() = Some((auth, body));
                    StatusCode::ACCEPTED
                }
            }),
        );
        let base = spawn(app).await;

        let sender = SendGridEmailSender::with_endpoint("SG.test", format!("{}/v3/mail/send", base));
        sender.send(message()).await.unwrap();

        let (auth, body) = captured.lock().clone().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer SG.test"));
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "owner@example.com");
        assert_eq!(body["from"]["email"], "no-reply@example.com");
        assert_eq!(body["subject"], "New website feedback");
        assert_eq!(body["content"][0]["type"], "text/html");
        assert_eq!(body["content"][0]["value"], "<p>Great site</p>");
    }

    #[tokio::test]
    async fn sendgrid_sender_reports_provider_rejection() {
        let app = Router::new().route(
            "/v3/mail/send",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn(app).await;

        let sender = SendGridEmailSender::with_endpoint("SG.bad", format!("{}/v3/mail/send", base));
        let err = sender.send(message()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn resend_sender_posts_flat_payload() {
        let captured = Arc::new(Mutex::new(None::<serde_json::Value>));
        let sink = captured.clone();
        let app = Router::new().route(
            "/emails",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock() = Some(body);
                    Json(json!({ "id": "re_123" }))
                }
            }),
        );
        let base = spawn(app).await;

        let sender = ResendEmailSender::with_endpoint("re_test", format!("{}/emails", base));
        sender.send(message()).await.unwrap();

        let body = captured.lock().clone().unwrap();
        assert_eq!(body["to"], "owner@example.com");
        assert_eq!(body["from"], "no-reply@example.com");
        assert_eq!(body["html"], "<p>Great site</p>");
    }
}
