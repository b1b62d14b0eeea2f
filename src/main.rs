//! Feedback relay - mail relay and form client for the portfolio site
//!
//! `serve` runs the HTTP relay that turns feedback submissions into email.
//! `send` submits one submission to a running relay from the terminal.

mod cli;
mod client;
mod config;
mod error;
mod handlers;
mod services;
mod types;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, SendArgs};
use client::{FeedbackClient, SubmitOutcome, TerminalView};
use services::email_sender::create_email_sender;
use services::relay::Relay;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env before clap so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Send(args) => Ok(send(args).await),
    }
}

async fn serve() -> Result<()> {
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    let _guard = init_server_logging(&logs_dir);

    info!("Starting feedback relay...");

    let config = config::Config::from_env()?;
    info!(backend = ?config.mail.backend, "Configuration loaded");

    let sender = create_email_sender(&config.mail);
    let relay = Arc::new(Relay::new(&config.mail, sender));

    handlers::serve(config.bind_addr, relay).await
}

async fn send(args: SendArgs) -> ExitCode {
    init_client_logging();

    let client = FeedbackClient::new(args.endpoint.clone());
    info!(endpoint = client.endpoint(), "Submitting feedback");

    let mut view = TerminalView;
    match client.submit_from(&args.form_source(), &mut view).await {
        SubmitOutcome::Sent => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Stdout plus a daily rolling file in `logs_dir`.
/// `LOG_FORMAT=json` switches stdout to JSON lines for log collectors.
fn init_server_logging(logs_dir: &str) -> WorkerGuard {
    std::fs::create_dir_all(logs_dir).ok();

    let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "relay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,feedback_relay=debug,tower_http=debug".into()),
        ))
        .with((!json).then(tracing_subscriber::fmt::layer)) // stdout
        .with(json.then(|| tracing_subscriber::fmt::layer().json())) // stdout, JSON
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)) // file
        .init();

    guard
}

/// Diagnostics go to stderr so stdout carries only the status lines.
fn init_client_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
