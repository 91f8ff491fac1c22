//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bottube-agent", version, about = "BoTTube trending-interaction bot")]
pub struct Cli {
    /// Personality: default, funny, news or art (overrides BOTTUBE_PERSONALITY)
    #[arg(short, long, global = true)]
    pub personality: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interact now, then on a schedule until interrupted (default)
    Run,
    /// Register the agent on the platform
    Register,
    /// Show the agent profile
    Info,
    /// List trending videos
    Trending {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Prepare and upload a video
    Upload {
        path: PathBuf,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Comment on a video
    Comment { video_id: String, content: String },
    /// Like (or with --down, dislike) a video
    Vote {
        video_id: String,
        #[arg(long)]
        down: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
