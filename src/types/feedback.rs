//! Feedback submission sent from the site form to the relay

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name used when the submitter leaves it out.
pub const ANONYMOUS: &str = "Anonymous";

/// Subject qualifier used when no project is given.
pub const GENERAL_PROJECT: &str = "general";

/// One feedback form submission.
///
/// Absent or `null` fields fall back to their defaults: `name` becomes
/// [`ANONYMOUS`], everything else becomes an empty string. Numbers and
/// booleans are accepted and kept as their textual form, so `"rating": 5`
/// is the same as `"rating": "5"`. `0` and `false` read as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default = "default_name", deserialize_with = "name_or_anonymous")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub rating: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub message: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub project: String,
}

impl FeedbackSubmission {
    /// Parse a request body. Fields are read by name only: a body that is
    /// valid JSON but not an object carries no fields at all.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<Value>(body)? {
            object @ Value::Object(_) => serde_json::from_value(object),
            _ => serde_json::from_value(Value::Object(Default::default())),
        }
    }

    /// True when `rating` or `message` is empty.
    pub fn missing_required(&self) -> bool {
        self.rating.is_empty() || self.message.is_empty()
    }

    /// Project for the email subject, `"general"` when empty.
    pub fn project_label(&self) -> &str {
        if self.project.is_empty() {
            GENERAL_PROJECT
        } else {
            &self.project
        }
    }
}

fn default_name() -> String {
    ANONYMOUS.to_string()
}

fn name_or_anonymous<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_else(default_name))
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(String::new())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(false) => Ok(Some(String::new())),
        Value::Bool(true) => Ok(Some("true".to_string())),
        Value::Array(_) | Value::Object(_) => Err(de::Error::custom("expected a text value")),
    }
}
