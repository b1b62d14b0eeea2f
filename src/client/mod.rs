//! Feedback form client
//!
//! Collects one submission, posts it to the relay and writes the outcome to
//! a [`FormView`]. A failed submission is never an error for the caller: the
//! outcome is rendered as a status line and returned.

pub mod form;
pub mod view;

pub use form::{FeedbackForm, FormSource, MapFormSource};
pub use view::{FormView, SubmitGuard, TerminalView};

use serde_json::Value;
use tracing::{error, info};

pub const STATUS_SENDING: &str = "Sending...";
pub const STATUS_SENT: &str = "Thanks — feedback sent.";
pub const STATUS_REJECTED: &str = "Failed to send. Check console.";
pub const STATUS_NETWORK_ERROR: &str = "Network error — please try later.";

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Relay accepted the feedback.
    Sent,
    /// Relay answered with a non-success status and a JSON body.
    Rejected { status: u16, error: Option<String> },
    /// No usable response: connection failure or a body that is not JSON.
    TransportFailed,
}

impl SubmitOutcome {
    /// Status line shown to the submitter.
    pub fn status_text(&self) -> &str {
        match self {
            SubmitOutcome::Sent => STATUS_SENT,
            SubmitOutcome::Rejected { error: Some(error), .. } => error,
            SubmitOutcome::Rejected { error: None, .. } => STATUS_REJECTED,
            SubmitOutcome::TransportFailed => STATUS_NETWORK_ERROR,
        }
    }
}

pub struct FeedbackClient {
    http: reqwest::Client,
    endpoint: String,
}

impl FeedbackClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Collect the form from `source` and submit it.
    pub async fn submit_from<S, V>(&self, source: &S, view: &mut V) -> SubmitOutcome
    where
        S: FormSource,
        V: FormView + ?Sized,
    {
        let form = FeedbackForm::collect(source);
        self.submit(&form, view).await
    }

    /// Post `form` once. The submit control stays disabled until this returns.
    pub async fn submit<V>(&self, form: &FeedbackForm, view: &mut V) -> SubmitOutcome
    where
        V: FormView + ?Sized,
    {
        let mut view = SubmitGuard::engage(view);
        view.set_status(STATUS_SENDING);

        let outcome = self.post(form).await;
        view.set_status(outcome.status_text());
        if outcome == SubmitOutcome::Sent {
            view.reset();
        }
        outcome
    }

    async fn post(&self, form: &FeedbackForm) -> SubmitOutcome {
        let response = match self.http.post(&self.endpoint).json(form).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Feedback request failed: {}", e);
                return SubmitOutcome::TransportFailed;
            }
        };

        let status = response.status();
        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                error!(%status, "Feedback response was not JSON: {}", e);
                return SubmitOutcome::TransportFailed;
            }
        };

        if status.is_success() {
            info!("Feedback sent");
            return SubmitOutcome::Sent;
        }

        error!(%status, body = %data, "sendFeedback error");
        SubmitOutcome::Rejected {
            status: status.as_u16(),
            error: data.get("error").and_then(Value::as_str).map(str::to_string),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
