//! Bounded exponential backoff for REST calls.
//!
//! The default configuration performs no retries at all: a failed call is
//! reported once and the pipeline moves on. [`RetryConfig::STANDARD`] enables
//! three retries (1s, 2s, 4s) for transient failures only.

use std::{thread, time::Duration};

use tracing::warn;

/// Errors that can tell whether repeating the call might succeed.
pub trait Retriable {
    fn is_transient(&self) -> bool;
}

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap for exponential growth.
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Best-effort, single attempt per call.
    pub const NONE: Self = Self {
        max_retries: 0,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        backoff_multiplier: 1.0,
    };

    pub const STANDARD: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
        backoff_multiplier: 2.0,
    };

    /// Computes the delay for the given retry attempt (0-indexed).
    ///
    /// `initial_delay * backoff_multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_secs.max(0.0))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::NONE
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the retry
/// budget in `config` is spent. Returns the last error in the latter cases.
pub fn retry<T, E, F>(config: RetryConfig, what: &str, mut operation: F) -> Result<T, E>
where
    E: Retriable + std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < config.max_retries => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                warn!(
                    call = what,
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient failure, retrying"
                );
                thread::sleep(delay);
            }
            Err(err) => return Err(err),
        }
    }
}
