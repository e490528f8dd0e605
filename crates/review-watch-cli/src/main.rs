//! review-watch CLI
//!
//! Watches the review status of the latest homework submission and reports
//! every change to a Telegram chat.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use review_watch_clients::{PracticumClient, TelegramChannel};
use review_watch_core::{Credentials, CursorStart, LoopSettings, PollLoop};
use tracing_subscriber::EnvFilter;

/// review-watch - homework review status notifier
///
/// Polls the homework review API every ten minutes and sends a Telegram
/// message whenever the status of the most recent submission changes.
/// Reads PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID from the
/// environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "review-watch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Unix timestamp to start watching from (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    from_date: Option<i64>,

    /// Also send tick failures to the Telegram chat
    #[arg(long)]
    report_failures: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            report_failures: self.report_failures,
            cursor_start: self.from_date.map_or(CursorStart::Now, CursorStart::At),
            ..LoopSettings::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // A missing .env file is normal; the variables may already be exported.
    let dotenv = dotenvy::dotenv();

    if let Err(e) = init_tracing(args.verbose, args.log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "review-watch stopped");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Initializes the tracing subscriber.
///
/// Priority: `RUST_LOG` env var > `--verbose` flag > default (info).
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Checks credentials, builds the collaborators and runs the loop until Ctrl+C.
async fn run(args: &Args) -> anyhow::Result<()> {
    let credentials = Credentials::from_env()?;
    tracing::debug!(?credentials, "Credentials loaded");

    let settings = args.loop_settings();
    settings.validate()?;

    let api = PracticumClient::new(&credentials.practicum_token)
        .context("failed to create homework API client")?;
    let channel = TelegramChannel::new(&credentials.telegram_token, &credentials.telegram_chat_id)
        .context("failed to create Telegram channel")?;

    let mut poll = PollLoop::new(api, channel, settings);

    tokio::select! {
        () = poll.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
