//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::TxError;

/// Retry contract for pipeline failures.
///
/// Only failures that are safe to resubmit are retried here; a pending
/// timeout is recovered by re-polling its handle, never by running the
/// operation again.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` under the policy, retrying failures classified resubmit-safe.
pub async fn retry_with_policy<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, TxError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TxError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_resubmit_safe() && attempt + 1 < policy.max_attempts => {
                tracing::warn!(attempt, error = %e, "retrying after transient failure");
                tokio::time::sleep(policy.backoff_delay(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
