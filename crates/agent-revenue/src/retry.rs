//! Retry with jittered exponential backoff for overcapacity failures
//!
//! Only [`AgentError::Retryable`] failures are retried. The wait before the
//! retry that follows attempt `n` (0-based) is `base * 2^n` plus a uniform
//! jitter in `[0, 1)` seconds. No wait follows the final attempt.

use crate::config::RevenueAgentConfig;
use crate::error::{AgentError, Result, RevenueError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Backoff before the first retry, doubled for each later one
    pub base_backoff: Duration,

    /// Upper bound of the random jitter added to every backoff
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts,
            base_backoff,
            ..Self::default()
        }
    }

    pub fn from_config(config: &RevenueAgentConfig) -> Result<Self> {
        let base_backoff = Duration::try_from_secs_f64(config.base_backoff_seconds)
            .map_err(|e| RevenueError::Config(format!("base_backoff_seconds: {e}")))?;
        Ok(Self::new(config.max_retries, base_backoff))
    }

    /// Backoff after `attempt` (0-based), before jitter; saturates at `Duration::MAX`
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if self.base_backoff.is_zero() {
            return Duration::ZERO;
        }
        let factor = 2_f64.powi(attempt.min(i32::MAX as u32) as i32);
        Duration::try_from_secs_f64(self.base_backoff.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX)
    }

    fn jittered_backoff(&self, attempt: u32) -> Duration {
        self.backoff_duration(attempt)
            .saturating_add(self.max_jitter.mul_f64(rand::random::<f64>()))
    }

    /// Execute an async operation with retry logic
    ///
    /// `on_retry(attempt, delay)` is called before each backoff sleep with the
    /// 1-based number of the attempt that just failed.
    ///
    /// Returns the first success, [`RevenueError::Agent`] for a fatal failure,
    /// or [`RevenueError::AgentUnavailable`] once every attempt was over capacity.
    pub async fn execute<F, Fut, T, R>(
        &self,
        operation_name: &str,
        mut on_retry: R,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, AgentError>>,
        R: FnMut(u32, Duration),
    {
        for attempt in 0..self.max_attempts {
            debug!(
                attempt = attempt + 1,
                max_attempts = self.max_attempts,
                operation = operation_name,
                "Attempting operation"
            );

            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(operation = operation_name, retries = attempt, "Operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(AgentError::Fatal(message)) => {
                    debug!(operation = operation_name, "Operation failed with non-retryable error");
                    return Err(RevenueError::Agent(message));
                }
                Err(AgentError::Retryable(message)) => {
                    if attempt + 1 < self.max_attempts {
                        let backoff = self.jittered_backoff(attempt);
                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            error = %message,
                            backoff_secs = backoff.as_secs_f64(),
                            "Over capacity, retrying"
                        );
                        on_retry(attempt + 1, backoff);
                        sleep(backoff).await;
                    }
                }
            }
        }

        warn!(
            operation = operation_name,
            attempts = self.max_attempts,
            "Operation still over capacity after all attempts"
        );
        Err(RevenueError::AgentUnavailable {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_from_config() {
        let config = RevenueAgentConfig {
            max_retries: 3,
            base_backoff_seconds: 0.5,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(1));
    }

    #[test]
    fn test_from_config_rejects_unrepresentable_backoff() {
        let config = RevenueAgentConfig {
            base_backoff_seconds: 1e20,
            ..Default::default()
        };
        assert!(matches!(
            RetryPolicy::from_config(&config),
            Err(RevenueError::Config(_))
        ));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(200, Duration::from_secs(600));
        assert_eq!(policy.backoff_duration(150), Duration::MAX);
        assert_eq!(policy.jittered_backoff(150), Duration::MAX);
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_duration(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let backoff = policy.jittered_backoff(1);
            assert!(backoff >= Duration::from_secs(2));
            assert!(backoff < Duration::from_secs(3));
        }
    }

    #[tokio::test]
    async fn test_execute_success_first_try() {
        let policy = RetryPolicy::default();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();

        let result = policy
            .execute("test_op", |_, _| {}, || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Ok::<i32, AgentError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*attempt_count.lock().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let policy = RetryPolicy::default();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();
        let mut delays = Vec::new();

        let result = policy
            .execute(
                "test_op",
                |_, delay| delays.push(delay),
                || {
                    let count = count.clone();
                    async move {
                        let mut n = count.lock().await;
                        *n += 1;
                        if *n < 3 {
                            Err(AgentError::Retryable("503 Service Unavailable".to_string()))
                        } else {
                            Ok("done")
                        }
                    }
                },
            )
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(*attempt_count.lock().await, 3);
        assert_eq!(delays.len(), 2);
        assert!(delays[0] >= Duration::from_secs(1) && delays[0] < Duration::from_secs(2));
        assert!(delays[1] >= Duration::from_secs(2) && delays[1] < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_fatal_not_retried() {
        let policy = RetryPolicy::default();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();

        let result: Result<()> = policy
            .execute("test_op", |_, _| panic!("no retry expected"), || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Err(AgentError::Fatal("invalid api key".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(RevenueError::Agent(msg)) if msg == "invalid api key"));
        assert_eq!(*attempt_count.lock().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let mut retries = Vec::new();

        let result: Result<()> = policy
            .execute(
                "test_op",
                |attempt, _| retries.push(attempt),
                || async { Err(AgentError::Retryable("over capacity".to_string())) },
            )
            .await;

        assert!(matches!(
            result,
            Err(RevenueError::AgentUnavailable { attempts: 3 })
        ));
        // no sleep after the final attempt
        assert_eq!(retries, vec![1, 2]);
    }
}
