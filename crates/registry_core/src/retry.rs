//! Bounded retry with a fixed backoff.
//!
//! A [`Retrier`] is the attempt counter for exactly one outbound call
//! sequence. [`RetryConfig::retrier`] hands out a fresh one per call, so
//! concurrent calls through the same adapter never share a counter.

use std::future::Future;
use std::time::Duration;

use crate::error::DownstreamError;

pub const DEFAULT_BACKOFF_MILLIS: u64 = 100;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Fixed wait between two attempts.
    pub backoff_millis: u64,
    /// Attempt ceiling, first attempt included. Zero behaves as one.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_millis: DEFAULT_BACKOFF_MILLIS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_millis)
    }

    pub fn attempt_ceiling(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn retrier(&self) -> Retrier {
        Retrier {
            config: *self,
            attempt: 1,
        }
    }
}

/// Errors that can tell whether another attempt might succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for DownstreamError {
    fn is_retryable(&self) -> bool {
        DownstreamError::is_retryable(self)
    }
}

#[derive(Debug)]
pub struct Retrier {
    config: RetryConfig,
    attempt: u32,
}

impl Retrier {
    /// The attempt about to run (or that just ran), starting at 1.
    #[cfg(test)]
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Hand back `err` if it is final, otherwise wait out the backoff and
    /// advance to the next attempt.
    pub async fn continue_or_propagate<E: Retryable>(&mut self, err: E) -> Result<(), E> {
        if !err.is_retryable() || self.attempt >= self.config.attempt_ceiling() {
            return Err(err);
        }
        self.attempt += 1;
        tokio::time::sleep(self.config.backoff()).await;
        Ok(())
    }

    /// Drive `op` until it succeeds or the failure is final. `op` receives
    /// the current attempt number.
    pub async fn run<T, E, F, Fut>(mut self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        loop {
            let attempt = self.attempt;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::debug!(
                        attempt,
                        max_attempts = self.config.attempt_ceiling(),
                        error = %err,
                        "downstream attempt failed"
                    );
                    self.continue_or_propagate(err).await?;
                }
            }
        }
    }
}
