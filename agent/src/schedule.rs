//! Interval schedule and the main polling loop.
//!
//! One run fires immediately, then every `interval`.  The loop wakes up
//! every `check_interval` to see whether a run is due and exits once the
//! shutdown flag is set.  Nothing is persisted: a restart starts over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

/// Longest uninterrupted sleep, so a shutdown request is seen quickly.
const SLEEP_SLICE: Duration = Duration::from_secs(1);

/// Why a job is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The run right after startup.
    Startup,
    /// A run that came due on the schedule.
    Scheduled,
}

/// A single recurring job.
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    next_run: Instant,
}

impl Schedule {
    /// First run one `interval` after `now`.
    pub fn every(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_run: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }

    /// Reschedule from the moment the job ran.  Missed slots are not
    /// caught up.
    pub fn mark_ran(&mut self, now: Instant) {
        self.next_run = now + self.interval;
    }

    /// Time left until the next run (zero when due).
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_run.saturating_duration_since(now)
    }
}

/// Run `job` once now, then every `interval`, until `shutdown` is set.
///
/// Blocks the calling thread.
pub fn run_loop<F>(interval: Duration, check_interval: Duration, shutdown: &AtomicBool, mut job: F)
where
    F: FnMut(Trigger),
{
    job(Trigger::Startup);

    let mut schedule = Schedule::every(interval, Instant::now());
    info!(
        "Scheduled every {:.2} hour(s), next run at {}",
        interval.as_secs_f64() / 3600.0,
        wall_clock_after(schedule.remaining(Instant::now()))
    );
    info!("Press Ctrl+C to stop");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        if schedule.is_due(Instant::now()) {
            job(Trigger::Scheduled);
            schedule.mark_ran(Instant::now());
            info!(
                "Next run at {}",
                wall_clock_after(schedule.remaining(Instant::now()))
            );
        }

        sleep_unless_shutdown(check_interval, shutdown);
    }

    info!("Bot stopped");
}

/// Sleep for `total`, returning early once `shutdown` is set.
fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

fn wall_clock_after(d: Duration) -> String {
    let when = chrono::Local::now()
        + chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::zero());
    when.format("%Y-%m-%d %H:%M:%S").to_string()
}
