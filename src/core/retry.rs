//! Bounded retry with exponential backoff for outbound calls.
//!
//! Every attempt is bounded by a timeout. The default policy makes a single
//! attempt, so a failure goes straight to the caller's fallback path.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::warn;

use crate::adapters::AdapterError;

/// Retry policy for outbound service calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including first try)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff multiplier (delay *= multiplier after each retry)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    1
}
fn default_initial_delay() -> u64 {
    500
}
fn default_max_delay() -> u64 {
    8000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn single_attempt() -> Self {
        Self::default()
    }

    /// Calculate delay for a specific attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay = self.initial_delay_ms as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let capped = delay.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(capped)
    }

    /// Check if we should retry based on attempt count
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Run `op` until it succeeds, the attempts run out, or it fails with a
    /// non-transient adapter error. Each attempt is bounded by `limit`.
    pub async fn run<T, F, Fut>(&self, label: &str, limit: Duration, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = match timeout(limit, op()).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!("{} timed out after {:?}", label, limit)),
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let transient = err
                .downcast_ref::<AdapterError>()
                .map(AdapterError::is_transient)
                .unwrap_or(true);

            if !transient || !self.should_retry(attempt) {
                return Err(err);
            }

            let delay = self.delay_for_attempt(attempt);
            warn!(
                operation = label,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_policy_delays() {
        let policy = RetryPolicy {
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 10000,
            ..Default::default()
        };

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(8000));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(10000)); // Capped
    }

    #[test]
    fn test_default_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::single_attempt());
        assert!(!policy.should_retry(1));
    }

    #[tokio::test]
    async fn test_run_retries_until_success() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            ..Default::default()
        };
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let value = policy
            .run("flaky", Duration::from_secs(1), move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(anyhow!("attempt {} failed", n))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_malformed_output() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay_ms: 1,
            ..Default::default()
        };
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<()> = policy
            .run("parse", Duration::from_secs(1), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), anyhow::Error>(AdapterError::Malformed {
                    service: "openai",
                    detail: "not json".to_string(),
                }
                .into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let policy = RetryPolicy::single_attempt();

        let result: Result<()> = policy
            .run("slow", Duration::from_millis(20), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<(), anyhow::Error>(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("slow timed out"));
    }
}
