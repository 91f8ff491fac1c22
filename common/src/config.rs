//! Configuration loading – reads `KEY=VALUE` settings from the process
//! environment (after `.env` has been merged in by the binary).
//!
//! Every value is read once at startup.  Only the API key and the agent
//! name are mandatory; everything else has a default.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::personality::{self, Personality};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://bottube.ai/api";

/// Upper bound for `SCHEDULE_HOURS` (one year).
pub const MAX_SCHEDULE_HOURS: f64 = 24.0 * 365.0;

/// Example configuration shipped next to the binary.
pub const EXAMPLE_ENV_FILE: &str = ".env.example";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOTTUBE_API_KEY and BOTTUBE_AGENT_NAME must both be set")]
    MissingCredentials,
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("unknown personality {0:?} (expected one of: {keys})", keys = personality::keys().join(", "))]
    UnknownPersonality(String),
}

/// API key + agent name.  Immutable once built.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    agent_name: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_name: agent_name.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }
}

// The key is a secret; keep it out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("agent_name", &self.agent_name)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub personality: &'static Personality,

    // ── network ──────────────────────────────────────────────────────
    pub base_url: String,

    // ── media ────────────────────────────────────────────────────────
    /// Where prepared (transcoded) videos are written.
    pub video_dir: PathBuf,
    /// Transcoder executable, looked up on `PATH` when not absolute.
    pub ffmpeg_bin: PathBuf,

    // ── scheduling ───────────────────────────────────────────────────
    /// Hours between scheduled interactions.
    pub schedule_hours: f64,
    /// How often the main loop checks for pending work (seconds).
    pub check_interval_secs: u64,
}

impl Config {
    /// Interval between scheduled interactions.
    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs_f64(self.schedule_hours * 3600.0)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

/// Read the configuration from the process environment.
pub fn load(personality_override: Option<&str>) -> Result<Config, ConfigError> {
    let config = from_lookup(personality_override, |key| std::env::var(key).ok())?;
    info!(
        "Loaded config (agent={}, personality={})",
        config.credentials.agent_name(),
        config.personality.key
    );
    Ok(config)
}

/// Build a [`Config`] from an arbitrary key lookup.
///
/// Empty values count as unset.  `personality_override` (from the command
/// line) wins over `BOTTUBE_PERSONALITY`.
pub fn from_lookup<F>(personality_override: Option<&str>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| -> Option<String> {
        lookup(key)
            .map(|v| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    };

    let (api_key, agent_name) = match (get("BOTTUBE_API_KEY"), get("BOTTUBE_AGENT_NAME")) {
        (Some(k), Some(n)) => (k, n),
        _ => return Err(ConfigError::MissingCredentials),
    };

    let personality_key = personality_override
        .map(str::to_string)
        .or_else(|| get("BOTTUBE_PERSONALITY"))
        .unwrap_or_else(|| personality::DEFAULT.key.to_string());
    let personality = personality::by_key(&personality_key)
        .ok_or_else(|| ConfigError::UnknownPersonality(personality_key.clone()))?;

    let schedule_hours = match get("SCHEDULE_HOURS") {
        Some(v) => match v.parse::<f64>() {
            Ok(h) if h > 0.0 && h <= MAX_SCHEDULE_HOURS => h,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "SCHEDULE_HOURS",
                    value: v,
                })
            }
        },
        None => personality.default_interval_hours,
    };

    let check_interval_secs = match get("CHECK_INTERVAL_SECS") {
        Some(v) => match v.parse::<u64>() {
            Ok(s) if s > 0 => s,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "CHECK_INTERVAL_SECS",
                    value: v,
                })
            }
        },
        None => 60,
    };

    Ok(Config {
        credentials: Credentials::new(api_key, personality.agent_name(&agent_name)),
        personality,
        base_url: get("BOTTUBE_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        video_dir: PathBuf::from(get("VIDEO_DIR").unwrap_or_else(|| "videos/".into())),
        ffmpeg_bin: PathBuf::from(get("FFMPEG_BIN").unwrap_or_else(|| "ffmpeg".into())),
        schedule_hours,
        check_interval_secs,
    })
}

// ─── tests ───────────────────────────────────────────────────────────────
