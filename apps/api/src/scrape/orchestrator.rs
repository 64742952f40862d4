//! Scrape job polling with bounded exponential backoff.
//!
//! The loop suspends between attempts, multiplies the delay after every
//! attempt (success or transient failure), and never outlives the absolute
//! wall-clock deadline. A deadline without a terminal status is an "unknown
//! outcome" for the caller, not an error.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::scrape::client::{ScrapeApi, ScrapeJob};

const BACKOFF_FACTOR: f64 = 1.5;

/// Polling schedule. Values come from `Config` in production; tests shrink
/// them to keep paused-clock runs tight.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub deadline: Duration,
}

impl PollSchedule {
    pub fn from_millis(initial: u64, max: u64, deadline: u64) -> Self {
        Self {
            initial_delay: Duration::from_millis(initial),
            max_delay: Duration::from_millis(max),
            deadline: Duration::from_millis(deadline),
        }
    }
}

/// Polls `job_id` until a terminal status or the deadline, whichever comes
/// first. Returns the last successfully observed snapshot; `None` means no
/// poll ever succeeded before the deadline.
///
/// Transport errors during polling are transient: the loop keeps going and
/// carries the previous snapshot forward.
pub async fn await_terminal(
    api: &dyn ScrapeApi,
    job_id: &str,
    schedule: PollSchedule,
) -> Option<ScrapeJob> {
    let deadline = Instant::now() + schedule.deadline;
    let mut delay = schedule.initial_delay;
    let mut last_observed: Option<ScrapeJob> = None;

    loop {
        let now = Instant::now();
        if now >= deadline {
            debug!("Polling deadline reached for job {job_id}");
            return last_observed;
        }

        // Never sleep past the deadline.
        sleep(delay.min(deadline - now)).await;

        if Instant::now() >= deadline {
            debug!("Polling deadline reached for job {job_id}");
            return last_observed;
        }

        match api.status(job_id).await {
            Ok(job) => {
                let terminal = job.status.is_terminal();
                debug!("Job {job_id} observed status {:?}", job.status);
                last_observed = Some(job);
                if terminal {
                    return last_observed;
                }
            }
            Err(e) => {
                // Transient: keep polling with the last snapshot intact.
                warn!("Poll attempt for job {job_id} failed: {e}");
            }
        }

        delay = delay.mul_f64(BACKOFF_FACTOR).min(schedule.max_delay);
    }
}
