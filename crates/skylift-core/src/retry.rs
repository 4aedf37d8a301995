//! Bounded fixed-interval polling for slow platform provisioning.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{SkyliftError, SkyliftResult};

/// How often and how many times to poll before giving up.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for PollPolicy {
    /// Matches the platform-provisioning waits: 10 attempts, 5 seconds apart.
    fn default() -> Self {
        Self::new(10, Duration::from_secs(5))
    }
}

/// Poll `op` until it yields a value or the policy is exhausted.
///
/// `op` returns `Ok(Some(value))` when the condition holds, `Ok(None)` to
/// keep waiting, and `Err` for a failed attempt (also retried). Exhaustion
/// yields [`SkyliftError::Timeout`] naming `what`, with the last attempt
/// error attached when there was one.
pub async fn poll_until<T, F, Fut>(policy: PollPolicy, what: &str, mut op: F) -> SkyliftResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SkyliftResult<Option<T>>>,
{
    let mut last_error: Option<SkyliftError> = None;
    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {
                debug!(what, attempt, max = policy.max_attempts, "not ready yet");
            }
            Err(e) => {
                warn!(what, attempt, max = policy.max_attempts, error = %e, "poll attempt failed");
                last_error = Some(e);
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(match last_error {
        Some(e) => SkyliftError::timeout(format!("{} (last error: {})", what, e)),
        None => SkyliftError::timeout(what.to_string()),
    })
}
