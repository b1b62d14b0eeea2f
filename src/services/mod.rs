//! Mail relay services

pub mod email_sender;
pub mod email_templates;
pub mod relay;
