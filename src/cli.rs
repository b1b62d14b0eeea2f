//! CLI argument parsing for the feedback-relay binary.

use clap::{Args, Parser, Subcommand};

use crate::client::MapFormSource;
use crate::config::DEFAULT_RELAY_URL;

#[derive(Parser)]
#[command(name = "feedback-relay", about = "Portfolio feedback mail relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server (default if no subcommand given)
    Serve,
    /// Submit one piece of feedback to a running relay
    Send(SendArgs),
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Relay endpoint
    #[arg(long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub endpoint: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Star rating, e.g. 5
    #[arg(long)]
    pub rating: Option<String>,

    #[arg(long)]
    pub message: Option<String>,

    /// Project the feedback is about
    #[arg(long)]
    pub project: Option<String>,
}

impl SendArgs {
    /// Flags that were not passed behave like form elements missing from the page.
    pub fn form_source(&self) -> MapFormSource {
        MapFormSource::new()
            .with_opt("name", self.name.clone())
            .with_opt("email", self.email.clone())
            .with_opt("rating", self.rating.clone())
            .with_opt("message", self.message.clone())
            .with_opt("project", self.project.clone())
    }
}
