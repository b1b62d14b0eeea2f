//! Feedback notification email.
//!
//! `FeedbackEmail::render()` returns an `EmailMessage` ready to pass to
//! `EmailSender::send`. Every user-supplied value goes through
//! [`escape_html`] before it lands in the body.

use chrono::{DateTime, Utc};

use crate::services::email_sender::EmailMessage;
use crate::types::FeedbackSubmission;

/// Escape the five HTML-significant characters.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub struct FeedbackEmail<'a> {
    pub submission: &'a FeedbackSubmission,
    pub to: &'a str,
    pub from: &'a str,
    pub received_at: DateTime<Utc>,
}

impl<'a> FeedbackEmail<'a> {
    pub fn subject(&self) -> String {
        format!(
            "New website feedback — {}★ — {}",
            self.submission.rating,
            self.submission.project_label()
        )
    }

    pub fn render(&self) -> EmailMessage {
        let s = self.submission;
        let message = escape_html(&s.message).replace('\n', "<br/>");

        let html = format!(
            r#"<h3>New feedback received</h3>
<p><strong>Name:</strong> {name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Rating:</strong> {rating}</p>
<p><strong>Project:</strong> {project}</p>
<h4>Message</h4>
<p>{message}</p>
<hr/>
<small>Received at {received}</small>"#,
            name = escape_html(&s.name),
            email = escape_html(&s.email),
            rating = escape_html(&s.rating),
            project = escape_html(&s.project),
            message = message,
            received = self.received_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        EmailMessage {
            to: self.to.to_string(),
            from: self.from.to_string(),
            subject: self.subject(),
            html,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
