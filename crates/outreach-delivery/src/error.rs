use std::time::Duration;

use thiserror::Error;

/// How the dispatcher reacts to a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Back off the limiter, then retry once.
    Quota,
    /// Retry once after a short pause.
    Transient,
    /// Report FAILED without retrying.
    Permanent,
}

/// Errors returned by a delivery transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery quota exceeded")]
    QuotaExceeded { retry_after: Option<Duration> },

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("authorization revoked: {0}")]
    Unauthorized(String),

    #[error("delivery rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("delivery service unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("delivery timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The outbound message could not be assembled.
    #[error("could not build message: {0}")]
    Message(String),
}

impl DeliveryError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::QuotaExceeded { .. } => FailureKind::Quota,
            Self::Http(_) | Self::Unavailable { .. } | Self::Timeout { .. } => {
                FailureKind::Transient
            }
            Self::InvalidRecipient(_)
            | Self::Unauthorized(_)
            | Self::Rejected { .. }
            | Self::Message(_) => FailureKind::Permanent,
        }
    }
}

/// Rejected token-bucket parameters.
#[derive(Debug, Error)]
#[error("invalid delivery limiter configuration: {0}")]
pub struct LimiterConfigError(pub String);
