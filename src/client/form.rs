//! Reading the feedback form's fields

use std::collections::HashMap;

use serde::Serialize;

use crate::types::ANONYMOUS;

/// Where the form's field values come from.
///
/// `field` returns `None` when the page has no element by that name, so a
/// partially rendered form still produces a complete payload.
pub trait FormSource {
    fn field(&self, name: &str) -> Option<String>;

    /// Value of `name`, or `fallback` when the element is absent or empty.
    fn field_or(&self, name: &str, fallback: &str) -> String {
        self.field(name)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Field values keyed by element id.
#[derive(Debug, Clone, Default)]
pub struct MapFormSource {
    fields: HashMap<String, String>,
}

impl MapFormSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Insert `value` only when it is present.
    pub fn with_opt(self, name: &str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }
}

impl FormSource for MapFormSource {
    fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// The JSON body posted to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub rating: String,
    pub message: String,
    pub project: String,
}

impl FeedbackForm {
    /// Gather the five fields, substituting defaults for missing ones.
    /// No validation happens here; the relay decides what is acceptable.
    pub fn collect(source: &impl FormSource) -> Self {
        Self {
            name: source.field_or("name", ANONYMOUS),
            email: source.field_or("email", ""),
            rating: source.field_or("rating", ""),
            message: source.field_or("message", ""),
            project: source.field_or("project", ""),
        }
    }
}
