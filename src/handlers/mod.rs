//! HTTP handlers and server loop

pub mod feedback;
pub mod ping;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::services::relay::Relay;

/// Build the relay router. Routes live under `/relay`.
pub fn router(relay: Arc<Relay>) -> Router {
    // The static site may be served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let relay_routes = Router::new()
        .route("/send-feedback", post(feedback::send_feedback))
        .route("/ping", get(ping::handle_ping))
        .layer(DefaultBodyLimit::max(feedback::MAX_BODY_BYTES))
        .with_state(relay);

    Router::new()
        .nest("/relay", relay_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, relay: Arc<Relay>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Relay listening on {}", addr);

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server error")?;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{EmailBackend, MailConfig};
    use crate::services::email_sender::{EmailSender, FakeEmailSender};

    fn mail(to: Option<&str>) -> MailConfig {
        MailConfig {
            backend: EmailBackend::SendGrid,
            from_email: "no-reply@example.com".into(),
            to_email: to.map(str::to_string),
            api_key: Some("SG.test".into()),
        }
    }

    fn app(sender: &Arc<FakeEmailSender>) -> Router {
        let relay = Relay::new(&mail(Some("owner@example.com")), Some(sender.clone() as Arc<dyn EmailSender>));
        router(Arc::new(relay))
    }

    async fn post_feedback(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/relay/send-feedback")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn scenario_anonymous_five_star_feedback_is_sent() {
        let sender = Arc::new(FakeEmailSender::new());
        let payload = json!({ "name": "", "email": "", "rating": "5", "message": "Great site", "project": "" });

        let (status, body) = post_feedback(app(&sender), payload.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "message": "Email sent" }));
        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("5★"));
        assert!(sent[0].subject.contains("general"));
    }

    #[tokio::test]
    async fn scenario_empty_rating_and_message_is_rejected() {
        let sender = Arc::new(FakeEmailSender::new());

        let (status, body) = post_feedback(app(&sender), r#"{"rating":"","message":""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing rating or message" }));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn scenario_provider_failure_returns_generic_500() {
        let sender = Arc::new(FakeEmailSender::failing("SendGrid API error 401: bad key SG.secret"));

        let (status, body) = post_feedback(app(&sender), r#"{"rating":"4","message":"Nice"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to send email" }));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn malformed_json_returns_400() {
        let sender = Arc::new(FakeEmailSender::new());

        let (status, body) = post_feedback(app(&sender), r#"{"rating": "5", "message": "#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid JSON" }));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn oversized_body_gets_json_error() {
        let sender = Arc::new(FakeEmailSender::new());
        let message = "a".repeat(feedback::MAX_BODY_BYTES + 1);
        let payload = json!({ "rating": "5", "message": message });

        let (status, body) = post_feedback(app(&sender), payload.to_string()).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "error": "Invalid JSON" }));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn array_body_is_rejected_without_sending() {
        let sender = Arc::new(FakeEmailSender::new());

        let (status, body) = post_feedback(app(&sender), r#"["Eve","e@x","5","hi","p"]"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing rating or message" }));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn unconfigured_relay_returns_500_before_parsing() {
        let relay = Relay::new(&mail(None), None);
        let app = router(Arc::new(relay));

        let (status, body) = post_feedback(app, "definitely not json").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Server not configured. Contact admin." }));
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let sender = Arc::new(FakeEmailSender::new());
        let response = app(&sender)
            .oneshot(
                Request::builder()
                    .uri("/relay/ping?message=hi")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Pong: hi");
    }

    #[tokio::test]
    async fn get_on_feedback_route_is_not_allowed() {
        let sender = Arc::new(FakeEmailSender::new());
        let response = app(&sender)
            .oneshot(
                Request::builder()
                    .uri("/relay/send-feedback")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(sender.attempts(), 0);
    }
}
