//! Wait - Drive a remote resource through pending states to a target state
//!
//! Remote control planes apply changes asynchronously. After submitting a
//! request, a provider observes the resource repeatedly until it settles in
//! a target state, disappears (for deletions) or the timeout elapses.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{Instant, sleep};

use crate::provider::{ProviderError, ProviderResult};

/// One observation of a remote resource
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<T> {
    /// The resource exists and reports `status`
    Found { status: String, value: T },
    /// The remote service reports the resource as absent
    NotFound,
}

/// How a wait ended successfully
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    /// A target state was reached; carries the last observed value
    Reached(T),
    /// The resource is gone and the wait had no target state
    Gone,
}

/// Classification of an observed status against a wait configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Target,
    Pending,
    /// Neither target nor pending; tolerated, polling continues
    Unknown,
}

/// Wait parameters
///
/// An empty `target` means the wait is for deletion: absence of the
/// resource is success.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitConfig {
    pub target: Vec<String>,
    pub pending: Vec<String>,
    /// Total time allowed, including the initial delay
    pub timeout: Duration,
    /// Interval after the first pending observation
    pub min_interval: Duration,
    /// Upper bound the doubling interval grows to
    pub max_interval: Duration,
    /// Wait before the first observation
    pub delay: Duration,
}

impl WaitConfig {
    pub fn new(target: &[&str], pending: &[&str]) -> Self {
        Self {
            target: target.iter().map(|s| s.to_string()).collect(),
            pending: pending.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(600),
            min_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            delay: Duration::ZERO,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether absence of the resource ends the wait successfully
    pub fn absence_is_success(&self) -> bool {
        self.target.is_empty()
    }
}

/// Classify `status` by exact match against target, then pending states
pub fn classify_status(status: &str, config: &WaitConfig) -> StatusClass {
    if config.target.iter().any(|t| t == status) {
        StatusClass::Target
    } else if config.pending.iter().any(|p| p == status) {
        StatusClass::Pending
    } else {
        StatusClass::Unknown
    }
}

/// Poll `refresh` until the resource reaches a target state
///
/// Errors returned by `refresh` end the wait immediately. The interval
/// between observations starts at `min_interval` and doubles up to
/// `max_interval`; no sleep extends past the deadline.
pub async fn wait_for_state<T, F, Fut>(
    identifier: &str,
    config: &WaitConfig,
    mut refresh: F,
) -> ProviderResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<Observation<T>>>,
{
    let start = Instant::now();
    let deadline = start + config.timeout;

    if !config.delay.is_zero() {
        sleep(config.delay).await;
    }

    let floor = Duration::from_millis(1);
    let max_interval = config.max_interval.max(config.min_interval).max(floor);
    let mut interval = config.min_interval.max(floor);

    loop {
        match refresh().await? {
            Observation::NotFound if config.absence_is_success() => {
                debug!("{} no longer exists", identifier);
                return Ok(WaitOutcome::Gone);
            }
            Observation::NotFound => {
                debug!("{} not found yet, waiting for it to appear", identifier);
            }
            Observation::Found { status, value } => match classify_status(&status, config) {
                StatusClass::Target => {
                    debug!("{} reached state {}", identifier, status);
                    return Ok(WaitOutcome::Reached(value));
                }
                StatusClass::Pending => {
                    debug!("{} is {}, waiting for {:?}", identifier, status, config.target);
                }
                StatusClass::Unknown => {
                    debug!(
                        "{} reported unexpected state {}, continuing to wait for {:?}",
                        identifier, status, config.target
                    );
                }
            },
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ProviderError::timeout(identifier, now - start));
        }
        sleep(interval.min(deadline - now)).await;
        interval = (interval * 2).min(max_interval);
    }
}
