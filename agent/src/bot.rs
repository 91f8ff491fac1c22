//! The bot context: configuration, client and personality, built once at
//! startup and handed to every operation.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use bottube_common::config::Config;
use bottube_common::personality::Personality;

use crate::client::PlatformClient;
use crate::interact::{self, InteractionReport};
use crate::schedule::{self, Trigger};

pub struct Bot {
    client: PlatformClient,
    personality: &'static Personality,
    schedule_interval: Duration,
    check_interval: Duration,
    throttle: Duration,
}

impl Bot {
    /// Create the video directory and the API client.
    pub fn new(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.video_dir).with_context(|| {
            format!("Cannot create video directory {}", config.video_dir.display())
        })?;

        let client = PlatformClient::from_config(config).context("Cannot create HTTP client")?;

        info!(
            "Bot initialised: {} as {} (personality={})",
            client.agent_name(),
            config.personality.display_name_for(client.agent_name()),
            config.personality.key
        );

        Ok(Self {
            client,
            personality: config.personality,
            schedule_interval: config.schedule_interval(),
            check_interval: config.check_interval(),
            throttle: interact::THROTTLE,
        })
    }

    /// Override the pause between videos.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    /// Like and comment on the top trending videos with a comment drawn
    /// from the personality.
    pub fn interact(&self, trigger: Trigger) -> InteractionReport {
        let mut rng = rand::thread_rng();
        let comment = match trigger {
            Trigger::Startup => self.personality.first_comment(&mut rng),
            Trigger::Scheduled => self.personality.pick_comment(&mut rng),
        };
        info!("Interacting with trending videos ({trigger:?})");
        interact::interact_with_trending(&self.client, Some(&comment), true, self.throttle)
    }

    /// Interact now, then on the schedule, until `shutdown` is set.
    pub fn run(&self, shutdown: &AtomicBool) {
        schedule::run_loop(
            self.schedule_interval,
            self.check_interval,
            shutdown,
            |trigger| {
                self.interact(trigger);
            },
        );
    }
}
