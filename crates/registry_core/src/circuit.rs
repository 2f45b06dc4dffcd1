//! Per-dependency circuit breaker.
//!
//! Counts consecutive call sequences that ended in a retryable failure
//! (i.e. after the retrier gave up). At `failure_threshold` the circuit
//! opens and calls fail fast with [`DownstreamError::CircuitOpen`] until
//! `open_for` has elapsed; then the circuit goes half-open and exactly one
//! trial call is let through while everyone else keeps failing fast. A
//! successful trial closes the circuit, a failed one re-opens it. A trial
//! whose outcome is never recorded (its caller was cancelled) is replaced
//! by a new one after another `open_for`.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::DownstreamError;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_OPEN_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitConfig {
    pub failure_threshold: u32,
    pub open_for: Duration,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            open_for: Duration::from_secs(DEFAULT_OPEN_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
    /// A trial call admitted at `since` is in flight.
    HalfOpen { since: Instant },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitConfig,
    state: Mutex<CircuitState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(CircuitState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CircuitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> CircuitState {
        *self.lock()
    }

    /// Gate a call. Fails fast while open and while a half-open trial call
    /// is in flight. The first caller after the open window is the trial.
    pub fn try_acquire(&self) -> Result<(), DownstreamError> {
        let mut state = self.lock();
        let now = Instant::now();
        match *state {
            CircuitState::Closed { .. } => return Ok(()),
            CircuitState::Open { until } if now < until => {
                return Err(DownstreamError::CircuitOpen(self.name.clone()));
            }
            CircuitState::HalfOpen { since } if now < since + self.config.open_for => {
                return Err(DownstreamError::CircuitOpen(self.name.clone()));
            }
            CircuitState::Open { .. } | CircuitState::HalfOpen { .. } => {}
        }
        tracing::info!(dependency = %self.name, "circuit half-open, admitting trial call");
        *state = CircuitState::HalfOpen { since: now };
        Ok(())
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        if matches!(*state, CircuitState::HalfOpen { .. }) {
            tracing::info!(dependency = %self.name, "circuit closed");
        }
        *state = CircuitState::Closed {
            consecutive_failures: 0,
        };
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        let failures = match *state {
            CircuitState::Closed {
                consecutive_failures,
            } => consecutive_failures + 1,
            CircuitState::HalfOpen { .. } => self.config.failure_threshold,
            CircuitState::Open { .. } => return,
        };

        if failures >= self.config.failure_threshold.max(1) {
            tracing::warn!(
                dependency = %self.name,
                failures,
                open_for = ?self.config.open_for,
                "circuit opened"
            );
            *state = CircuitState::Open {
                until: Instant::now() + self.config.open_for,
            };
        } else {
            *state = CircuitState::Closed {
                consecutive_failures: failures,
            };
        }
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        matches!(self.state(), CircuitState::Open { until } if Instant::now() < until)
    }
}
