//! Bounded retry with randomized exponential backoff.
//!
//! Every stage invocation goes through [`retry`] with the same
//! [`RetryPolicy`]: any error is retried, and once the attempt budget is
//! spent the last error is handed back untouched.
//!
//! The delay after the n-th failure is drawn uniformly from
//! `[min_delay, clamp(1s * 2^(n-1), min_delay, max_delay)]`, so early
//! retries are quick and later ones spread out up to the ceiling.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Growth unit of the exponential window.
const BACKOFF_UNIT_MS: u64 = 1_000;

/// Attempt budget and delay bounds for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; never less than 1.
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// `max_attempts` attempts with no waiting in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// `(low, high)` delay bounds after `failures` failed attempts.
    pub fn window(&self, failures: u32) -> (Duration, Duration) {
        let exponent = failures.saturating_sub(1).min(32);
        let grown_ms = BACKOFF_UNIT_MS.saturating_mul(1u64 << exponent);
        let high = Duration::from_millis(grown_ms)
            .min(self.max_delay)
            .max(self.min_delay);
        (self.min_delay, high)
    }

    /// Pick the delay to sleep after `failures` failed attempts.
    pub fn delay_for<R: Rng + ?Sized>(&self, failures: u32, rng: &mut R) -> Duration {
        let (low, high) = self.window(failures);
        let ms = rng.random_range(low.as_millis() as u64..=high.as_millis() as u64);
        Duration::from_millis(ms)
    }
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// `label` names the stage in log lines. The closure is called once per
/// attempt and must build a fresh future each time.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{label}: succeeded on attempt {attempt}");
                }
                return Ok(value);
            }
            Err(err) if attempt >= policy.max_attempts => {
                log::error!("{label}: giving up after {attempt} attempts: {err}");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt, &mut rand::rng());
                log::warn!(
                    "{label}: attempt {attempt}/{} failed ({err}); retrying in {delay:?}",
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
