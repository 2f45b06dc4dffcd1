use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("{service} service call failed: {source}")]
    Downstream {
        service: &'static str,
        #[source]
        source: DownstreamError,
    },

    #[error("store: {0}")]
    Store(#[from] anyhow::Error),
}

impl RegistryError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} {id}"))
    }

    pub fn downstream(service: &'static str, source: DownstreamError) -> Self {
        Self::Downstream { service, source }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Downstream {
                source: DownstreamError::CircuitOpen(_),
                ..
            } => 503,
            Self::Downstream { .. } => 502,
            Self::Store(_) => 500,
        }
    }
}

/// A single rejected field of a creation payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

/// Failure of a call to the details or documents service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownstreamError {
    /// No connection was made; the request never reached the service.
    #[error("connect: {0}")]
    Connect(String),

    #[error("transport: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unavailable: HTTP {0}")]
    Unavailable(u16),

    #[error("rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("no instance registered for {0}")]
    Unresolved(String),

    #[error("circuit open for {0}")]
    CircuitOpen(String),
}

impl DownstreamError {
    /// Network, timeout and 5xx failures are worth another attempt.
    /// Application-level rejections, undecodable bodies and open circuits are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Transport(_) | Self::Timeout(_) | Self::Unavailable(_)
        )
    }

    /// Whether a non-idempotent request can be sent again. Only when the
    /// first one provably never arrived.
    pub fn is_safe_to_resend(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}
