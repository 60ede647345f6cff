use std::time::Duration;

use crate::foundation::error::{IcebergError, IcebergResult};

/// Bounded retry with linearly growing backoff for catalog calls.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failed attempt, in milliseconds; grows as `backoff_ms * attempt`.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps; used by offline sources and tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_ms: 0,
        }
    }

    /// Check the policy is usable.
    pub fn validate(&self) -> IcebergResult<()> {
        if self.max_attempts == 0 {
            return Err(IcebergError::validation(
                "retry.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Wait after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// Whether `error` after attempt number `attempt` should be retried.
    pub fn should_retry(&self, error: &IcebergError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Run `op` until it succeeds, fails terminally, or the attempt budget is spent.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> IcebergResult<T>,
    ) -> IcebergResult<T> {
        let mut attempt = 1u32;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(err) if self.should_retry(&err, attempt) => {
                    let wait = self.backoff_for(attempt);
                    tracing::warn!(
                        call = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "retrying catalog call"
                    );
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/retry.rs"]
mod tests;
