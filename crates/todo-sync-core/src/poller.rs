//! Job status polling.
//!
//! A job is queried, then re-queried every `interval` while it is pending.
//! The loop ends on the first terminal status or when the [`PollPolicy`]
//! runs out, which surfaces as `SyncError::JobTimedOut`.

use crate::api::TodoApi;
use crate::error::{SyncError, SyncResult};
use crate::models::JobStatus;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Status queries per job before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// How long and how often to poll a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between two status queries.
    pub interval: Duration,
    /// Maximum number of status queries; `None` for no limit.
    ///
    /// The first query is always sent, so the smallest limit is one.
    pub max_attempts: Option<NonZeroU32>,
    /// Maximum time spent polling, measured from the first query.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: NonZeroU32::new(DEFAULT_MAX_ATTEMPTS),
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Poll until the job terminates, however long that takes.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            deadline: None,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Cap the number of status queries. `0` is raised to one query.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN));
        self
    }

    /// Query limit as a plain count, `None` when unlimited.
    pub fn attempt_limit(&self) -> Option<u32> {
        self.max_attempts.map(NonZeroU32::get)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.deadline.is_some()
    }

    /// Whether another query is allowed after `attempts` queries, the next one
    /// starting one interval after `elapsed`.
    fn allows_another(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts >= max.get() {
                return false;
            }
        }
        if let Some(deadline) = self.deadline {
            if elapsed + self.interval > deadline {
                return false;
            }
        }
        true
    }
}

/// Waits for remote jobs to reach a terminal status.
#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn TodoApi>,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(api: Arc<dyn TodoApi>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Wait for `job_id` using the poller's default policy.
    pub async fn await_job(&self, job_id: &str) -> SyncResult<()> {
        self.await_job_with(job_id, &self.policy).await
    }

    /// Wait for `job_id` using `policy`.
    ///
    /// Errors from the status query itself are returned immediately.
    pub async fn await_job_with(&self, job_id: &str, policy: &PollPolicy) -> SyncResult<()> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let job = self.api.job_status(job_id).await?;

            match job.status {
                JobStatus::Completed => {
                    debug!(job_id = %job_id, attempts, "Job completed");
                    return Ok(());
                }
                JobStatus::Failed => {
                    warn!(job_id = %job_id, attempts, "Job failed");
                    return Err(SyncError::JobFailed {
                        job_id: job_id.to_string(),
                    });
                }
                JobStatus::Pending => {
                    if !policy.allows_another(attempts, started.elapsed()) {
                        info!(
                            job_id = %job_id,
                            attempts,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Job still pending, giving up"
                        );
                        return Err(SyncError::JobTimedOut {
                            job_id: job_id.to_string(),
                            attempts,
                        });
                    }
                    debug!(job_id = %job_id, attempts, "Job pending");
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }
}
