//! Mail relay: validate one feedback submission and hand it to the email
//! provider.
//!
//! Each call is a single pass with no retries:
//! configuration check → parse → validate → compose → deliver.
//! `Relay` holds only read-only state, so one instance is shared by every
//! request the server handles.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::MailConfig;
use crate::error::RelayError;
use crate::services::email_sender::EmailSender;
use crate::services::email_templates::FeedbackEmail;
use crate::types::{FeedbackSubmission, SentResponse};

pub struct Relay {
    from_email: String,
    to_email: Option<String>,
    sender: Option<Arc<dyn EmailSender>>,
}

impl Relay {
    /// `sender` is `None` when the provider credential is missing.
    pub fn new(mail: &MailConfig, sender: Option<Arc<dyn EmailSender>>) -> Self {
        Self {
            from_email: mail.from_email.clone(),
            to_email: mail.to_email.clone(),
            sender,
        }
    }

    fn delivery_target(&self) -> Result<(&Arc<dyn EmailSender>, &str), RelayError> {
        match (&self.sender, &self.to_email) {
            (Some(sender), Some(to)) => Ok((sender, to.as_str())),
            _ => {
                error!("Missing email credential or TO_EMAIL, refusing feedback");
                Err(RelayError::NotConfigured)
            }
        }
    }

    /// Fails with [`RelayError::NotConfigured`] when delivery is impossible.
    pub fn ensure_configured(&self) -> Result<(), RelayError> {
        self.delivery_target().map(|_| ())
    }

    /// Relay one raw request body.
    pub async fn relay(&self, body: &[u8]) -> Result<SentResponse, RelayError> {
        let (sender, to_email) = self.delivery_target()?;

        let submission = FeedbackSubmission::from_body(body).map_err(|e| {
            debug!("Rejecting feedback body: {}", e);
            RelayError::InvalidJson(e)
        })?;

        if submission.missing_required() {
            warn!(
                has_rating = !submission.rating.is_empty(),
                has_message = !submission.message.is_empty(),
                "Rejecting feedback without rating or message"
            );
            return Err(RelayError::MissingFields);
        }

        let email = FeedbackEmail {
            submission: &submission,
            to: to_email,
            from: &self.from_email,
            received_at: Utc::now(),
        }
        .render();

        if let Err(e) = sender.send(email).await {
            error!("Email provider error: {:#}", e);
            return Err(RelayError::Delivery(e.into()));
        }

        info!(rating = %submission.rating, project = %submission.project_label(), "Feedback relayed");
        Ok(SentResponse::email_sent())
    }
}

// =============================================================================
// Tests
// =============================================================================
