//! Type definitions

pub mod feedback;
pub mod messages;

pub use feedback::*;
pub use messages::*;
