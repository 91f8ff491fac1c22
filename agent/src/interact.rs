//! "Interact with trending": vote on and comment under the top trending
//! videos, one request at a time.

use std::time::Duration;

use tracing::{debug, info};

use bottube_common::protocol::Vote;

use crate::client::PlatformClient;

/// How many trending videos one interaction touches.
pub const TRENDING_SAMPLE: usize = 3;

/// Pause between two videos.
pub const THROTTLE: Duration = Duration::from_secs(1);

/// What one interaction did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionReport {
    /// Trending entries considered (at most [`TRENDING_SAMPLE`]).
    pub videos: usize,
    /// Entries without an identifier.
    pub skipped: usize,
    pub votes_sent: usize,
    pub votes_failed: usize,
    pub comments_sent: usize,
    pub comments_failed: usize,
}

impl InteractionReport {
    /// Number of vote + comment requests issued.
    pub fn calls(&self) -> usize {
        self.votes_sent + self.votes_failed + self.comments_sent + self.comments_failed
    }
}

/// For each of the top trending videos: like it when `vote` is set, then
/// post `comment` when given.  Entries without an id are skipped.
pub fn interact_with_trending(
    client: &PlatformClient,
    comment: Option<&str>,
    vote: bool,
    throttle: Duration,
) -> InteractionReport {
    let videos = client.get_trending(TRENDING_SAMPLE);
    let mut report = InteractionReport::default();
    let mut handled = 0usize;

    for video in videos.iter().take(TRENDING_SAMPLE) {
        report.videos += 1;

        let Some(video_id) = video.id() else {
            debug!("Skipping trending entry without video_id");
            report.skipped += 1;
            continue;
        };

        if handled > 0 && !throttle.is_zero() {
            std::thread::sleep(throttle);
        }
        handled += 1;

        if vote {
            match client.vote(&video_id, Vote::Like) {
                Ok(_) => report.votes_sent += 1,
                Err(_) => report.votes_failed += 1,
            }
        }

        if let Some(text) = comment {
            match client.comment(&video_id, text) {
                Ok(_) => report.comments_sent += 1,
                Err(_) => report.comments_failed += 1,
            }
        }
    }

    info!(
        "Trending interaction done: {} video(s), {} skipped, {} vote(s), {} comment(s)",
        report.videos, report.skipped, report.votes_sent, report.comments_sent
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_calls() {
        let report = InteractionReport {
            videos: 3,
            skipped: 1,
            votes_sent: 2,
            votes_failed: 0,
            comments_sent: 1,
            comments_failed: 1,
        };
        assert_eq!(report.calls(), 4);
    }
}
