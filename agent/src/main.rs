//! BoTTube Agent – interacts with trending videos on a timer.
//!
//! This binary:
//! 1. Merges `.env` into the environment and reads the configuration
//! 2. Likes and comments on the top trending videos right away
//! 3. Repeats every `SCHEDULE_HOURS` until Ctrl-C
//!
//! One-shot subcommands (register, info, upload, …) call a single
//! endpoint and print the JSON answer.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{error, info};

use bottube_agent::bot::Bot;
use bottube_agent::cli::{Cli, Command};
use bottube_agent::client::ApiResult;
use bottube_common::config::{self, ConfigError, EXAMPLE_ENV_FILE};
use bottube_common::protocol::Vote;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // ── load config ──────────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let config = match config::load(cli.personality.as_deref()) {
        Ok(c) => c,
        Err(ConfigError::MissingCredentials) => {
            error!("Please set BOTTUBE_API_KEY and BOTTUBE_AGENT_NAME");
            info!("Copy {EXAMPLE_ENV_FILE} to .env and fill in your credentials");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Config load failed"),
    };

    let bot = Bot::new(&config)?;
    let client = bot.client();

    match cli.command() {
        Command::Run => {
            // ── ctrl-c ───────────────────────────────────────────────
            ctrlc::set_handler(move || {
                SHUTDOWN.store(true, Ordering::Relaxed);
                info!("Shutdown signal received");
            })
            .context("Cannot set Ctrl-C handler")?;

            bot.run(&SHUTDOWN);
            Ok(())
        }
        Command::Register => print_result(client.register()),
        Command::Info => print_result(client.get_agent_info()),
        Command::Trending { limit } => {
            let videos = client.get_trending(limit);
            print_json(&serde_json::to_value(&videos)?)
        }
        Command::Upload {
            path,
            title,
            description,
            tags,
        } => print_result(client.upload_video(&path, &title, &description, &tags)),
        Command::Comment { video_id, content } => {
            print_result(client.comment(&video_id, &content))
        }
        Command::Vote { video_id, down } => {
            let vote = if down { Vote::Dislike } else { Vote::Like };
            print_result(client.vote(&video_id, vote))
        }
    }
}

/// Print the body (or the error as JSON); a failed call exits non-zero.
fn print_result(result: ApiResult) -> Result<()> {
    match result {
        Ok(body) => print_json(&body),
        Err(e) => {
            print_json(&e.to_json())?;
            Err(e.into())
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
