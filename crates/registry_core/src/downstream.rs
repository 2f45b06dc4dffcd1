//! Adapters for the two downstream services.
//!
//! Each adapter owns a [`DownstreamGuard`]: a circuit breaker, the retry
//! policy, and a [`FailurePolicy`] deciding what an exhausted call turns
//! into. Fail-open dependencies degrade to an empty value and log the
//! cause; propagating dependencies surface [`RegistryError::Downstream`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;

use crate::circuit::{CircuitBreaker, CircuitConfig};
use crate::error::{DownstreamError, RegistryError};
use crate::ports::{DetailsApi, DocumentsApi};
use crate::retry::{RetryConfig, Retryable};
use crate::types::{Document, EntityId, NewBankDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and return an empty result.
    FailOpen,
    /// Return the failure to the caller.
    Propagate,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "fail_open" | "failopen" => Ok(Self::FailOpen),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'fail-open' or 'propagate')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownstreamPolicy {
    pub retry: RetryConfig,
    pub circuit: CircuitConfig,
    pub on_failure: FailurePolicy,
}

impl DownstreamPolicy {
    pub fn fail_open() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit: CircuitConfig::default(),
            on_failure: FailurePolicy::FailOpen,
        }
    }

    pub fn propagate() -> Self {
        Self {
            on_failure: FailurePolicy::Propagate,
            ..Self::fail_open()
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_circuit(mut self, circuit: CircuitConfig) -> Self {
        self.circuit = circuit;
        self
    }
}

// ── DownstreamGuard ───────────────────────────────────────────

#[derive(Debug)]
pub struct DownstreamGuard {
    service: &'static str,
    policy: DownstreamPolicy,
    breaker: CircuitBreaker,
}

impl DownstreamGuard {
    pub fn new(service: &'static str, policy: DownstreamPolicy) -> Self {
        Self {
            service,
            policy,
            breaker: CircuitBreaker::new(service, policy.circuit),
        }
    }

    pub fn policy(&self) -> &DownstreamPolicy {
        &self.policy
    }

    #[cfg(test)]
    pub(crate) fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run one outbound call sequence: breaker gate, then a fresh retrier.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, DownstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        self.call_retrying_on(op, DownstreamError::is_retryable).await
    }

    /// Like [`call`](Self::call) for non-idempotent requests: a failed
    /// attempt is only re-sent when the service never received it.
    pub async fn call_write<T, F, Fut>(&self, op: F) -> Result<T, DownstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        self.call_retrying_on(op, DownstreamError::is_safe_to_resend).await
    }

    async fn call_retrying_on<T, F, Fut>(
        &self,
        mut op: F,
        retry_on: fn(&DownstreamError) -> bool,
    ) -> Result<T, DownstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        self.breaker.try_acquire()?;

        let result = self
            .policy
            .retry
            .retrier()
            .run(|attempt| {
                let attempt_fut = op(attempt);
                async move {
                    attempt_fut.await.map_err(|err| AttemptFailure {
                        retryable: retry_on(&err),
                        err,
                    })
                }
            })
            .await
            .map_err(|failure| failure.err);

        match &result {
            Err(err) if err.is_retryable() => self.breaker.record_failure(),
            _ => self.breaker.record_success(),
        }
        result
    }

    /// Turn a final outcome into what the caller sees under this policy.
    pub fn settle<T>(
        &self,
        bank_id: EntityId,
        result: Result<T, DownstreamError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, RegistryError> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match self.policy.on_failure {
            FailurePolicy::FailOpen => {
                tracing::error!(
                    service = self.service,
                    bank_id,
                    error = %err,
                    retry_marker = Utc::now().timestamp_millis(),
                    "downstream call failed, falling back to empty result"
                );
                Ok(fallback())
            }
            FailurePolicy::Propagate => {
                tracing::warn!(
                    service = self.service,
                    bank_id,
                    error = %err,
                    "downstream call failed"
                );
                Err(RegistryError::downstream(self.service, err))
            }
        }
    }
}

/// One failed attempt, classified by the caller's retry rule.
struct AttemptFailure {
    err: DownstreamError,
    retryable: bool,
}

impl Retryable for AttemptFailure {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

// ── DetailsAdapter ────────────────────────────────────────────

pub struct DetailsAdapter {
    api: Arc<dyn DetailsApi>,
    guard: DownstreamGuard,
}

impl DetailsAdapter {
    pub const SERVICE: &'static str = "details";

    pub fn new(api: Arc<dyn DetailsApi>, policy: DownstreamPolicy) -> Self {
        Self {
            api,
            guard: DownstreamGuard::new(Self::SERVICE, policy),
        }
    }

    pub fn guard(&self) -> &DownstreamGuard {
        &self.guard
    }

    /// Details body for a bank. Under fail-open a failed lookup reads as
    /// absent details.
    pub async fn details_by_bank_id(
        &self,
        bank_id: EntityId,
    ) -> Result<Option<serde_json::Value>, RegistryError> {
        let api = self.api.as_ref();
        let result = self
            .guard
            .call(move |_| api.details_by_bank_id(bank_id))
            .await;
        self.guard.settle(bank_id, result, || None)
    }

    /// Forward a details record to the details service. Only connection
    /// failures are retried, so a timed-out request that the service did
    /// commit is not created twice. Never fails open.
    pub async fn create_details(
        &self,
        details: &NewBankDetails,
    ) -> Result<serde_json::Value, RegistryError> {
        let api = self.api.as_ref();
        self.guard
            .call_write(move |_| api.create_details(details))
            .await
            .map_err(|err| RegistryError::downstream(Self::SERVICE, err))
    }
}

// ── DocumentsAdapter ──────────────────────────────────────────

pub struct DocumentsAdapter {
    api: Arc<dyn DocumentsApi>,
    guard: DownstreamGuard,
}

impl DocumentsAdapter {
    pub const SERVICE: &'static str = "documents";

    pub fn new(api: Arc<dyn DocumentsApi>, policy: DownstreamPolicy) -> Self {
        Self {
            api,
            guard: DownstreamGuard::new(Self::SERVICE, policy),
        }
    }

    pub fn guard(&self) -> &DownstreamGuard {
        &self.guard
    }

    pub async fn documents_by_bank_id(
        &self,
        bank_id: EntityId,
    ) -> Result<Vec<Document>, RegistryError> {
        let api = self.api.as_ref();
        let result = self
            .guard
            .call(move |_| api.documents_by_bank_id(bank_id))
            .await;
        self.guard.settle(bank_id, result, Vec::new)
    }
}
