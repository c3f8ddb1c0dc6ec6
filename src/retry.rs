//! Bounded retry for external write-type calls
//!
//! Every call that publishes an alert, writes a metric or fetches a secret
//! goes through [`retry`]. The attempt loop walks the states
//! `Attempting(n) -> Done`, `Attempting(n) -> Waiting -> Attempting(n + 1)`
//! and `Attempting(max) -> Failed(last error)`; an error classified
//! [`Classification::Fatal`] fails immediately.

use crate::error::RetryError;
use log::{debug, error, info, warn};
use std::future::Future;
use std::time::Duration;

/// How long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt
    Fixed(Duration),
    /// Jittered exponential growth from `min`, capped at `max`
    Exponential { min: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay(&self, failed_attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { min, max } => {
                exponential_backoff::Backoff::new(u32::MAX, min, Some(max))
                    .next(failed_attempt)
                    .map_or(max, |delay| delay.min(max))
            }
        }
    }
}

/// Retry budget shared by the notifier, the metric emitter and the
/// credential resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart, no jitter
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    pub fn exponential(max_attempts: u32, min: Duration, max: Duration) -> Self {
        Self::new(max_attempts, Backoff::Exponential { min, max })
    }

    /// Delay before the attempt following `failed_attempt`
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.backoff.delay(failed_attempt)
    }
}

/// Whether a failed attempt is worth repeating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    Fatal,
}

/// Run `action` until it succeeds, fails fatally, or the policy's attempts
/// are used up
///
/// `action` receives the 1-based attempt number. The last observed error is
/// returned on exhaustion. Sleeps between attempts use the tokio clock, so a
/// deadline wrapped around the caller also cancels a pending retry.
pub async fn retry<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    operation: &str,
    mut action: F,
    classify: C,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> Classification,
    E: std::error::Error + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!("{}: attempt {}/{}", operation, attempt, max_attempts);

        let error = match action(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{} succeeded on attempt {}", operation, attempt);
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if classify(&error) == Classification::Fatal {
            error!(
                "{} failed on attempt {} with a non-retryable error: {}",
                operation, attempt, error
            );
            return Err(RetryError::Fatal {
                operation: operation.to_string(),
                attempt,
                error,
            });
        }

        if attempt >= max_attempts {
            error!(
                "{} failed after {} attempts: {}",
                operation, attempt, error
            );
            return Err(RetryError::Exhausted {
                operation: operation.to_string(),
                attempts: attempt,
                last: error,
            });
        }

        let delay = policy.delay_after(attempt);
        warn!(
            "{} attempt {}/{} failed: {}; retrying in {:?}",
            operation, attempt, max_attempts, error, delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::error::ServiceError;
    use quickcheck_macros::quickcheck;

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    // Attempts made = min(failures + 1, max_attempts), and the call succeeds
    // exactly when the failures fit inside the budget.
    #[quickcheck]
    fn prop_attempt_count_respects_budget(failures: u8, max_attempts: u8) -> bool {
        let failures = u32::from(failures % 6);
        let max_attempts = u32::from(max_attempts % 5) + 1;
        let policy = RetryPolicy::fixed(max_attempts, Duration::from_millis(10));

        let rt = paused_runtime();
        let mut calls = 0u32;
        let result = rt.block_on(retry(
            &policy,
            "property",
            |attempt| {
                calls += 1;
                async move {
                    if attempt <= failures {
                        Err(ServiceError::Transient(format!("failure {}", attempt)))
                    } else {
                        Ok(attempt)
                    }
                }
            },
            ServiceError::classify,
        ));

        let expected_calls = (failures + 1).min(max_attempts);
        calls == expected_calls && result.is_ok() == (failures < max_attempts)
    }
}
