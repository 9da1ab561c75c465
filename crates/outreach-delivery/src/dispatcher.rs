//! Single-message delivery with one retry.
//!
//! Every attempt first takes a [`DeliveryLimiter`] permit. Quota responses
//! pause the whole limiter before the retry; a server that asks for a longer
//! pause than [`DispatchPolicy::max_quota_backoff`] fails the record instead
//! of stalling the delivery queue.

use std::sync::Arc;
use std::time::Duration;

use outreach_core::{DeliveryOutcome, GeneratedMessage, RecordState};

use crate::error::{DeliveryError, FailureKind};
use crate::limiter::DeliveryLimiter;
use crate::transport::{AccessToken, DeliveryReceipt, DeliveryTransport, OutboundMessage};

/// Attempts per message: the first send plus one retry.
const MAX_ATTEMPTS: u32 = 2;

/// Retry and timeout knobs for [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    /// Base limiter back-off after a quota response without `Retry-After`.
    pub quota_backoff: Duration,
    /// Pause before retrying a transient failure.
    pub transient_backoff: Duration,
    /// Per-call delivery timeout.
    pub call_timeout: Duration,
    /// Longest quota pause honoured before a retry.
    pub max_quota_backoff: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            quota_backoff: Duration::from_secs(2),
            transient_backoff: Duration::from_secs(1),
            call_timeout: Duration::from_secs(30),
            max_quota_backoff: Duration::from_secs(60),
        }
    }
}

/// Sends one message at a time through the [`DeliveryLimiter`].
pub struct Dispatcher {
    limiter: Arc<DeliveryLimiter>,
    transport: Arc<dyn DeliveryTransport>,
    policy: DispatchPolicy,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        limiter: Arc<DeliveryLimiter>,
        transport: Arc<dyn DeliveryTransport>,
        policy: DispatchPolicy,
    ) -> Self {
        Self {
            limiter,
            transport,
            policy,
        }
    }

    /// Delivers `message`, acquiring a limiter permit before every attempt.
    ///
    /// Quota and transient failures get exactly one retry; a quota failure
    /// also backs the limiter off so every later send waits too. Permanent
    /// failures are reported immediately. Never fails: the result is always
    /// a terminal `SENT` or `FAILED` outcome.
    pub async fn send(&self, credential: &AccessToken, message: &GeneratedMessage) -> DeliveryOutcome {
        let record = &message.record;
        let outbound = OutboundMessage::from(message);
        let mut attempts = 0u32;

        loop {
            let _permit = self.limiter.acquire().await;
            attempts += 1;
            let state = if attempts == 1 {
                RecordState::Sending
            } else {
                RecordState::Retrying
            };
            tracing::debug!(email = %record.email, attempt = attempts, state = ?state, "dispatching");

            let err = match self.attempt(credential, &outbound).await {
                Ok(receipt) => {
                    tracing::debug!(email = %record.email, attempts, state = ?RecordState::Sent, "delivered");
                    return DeliveryOutcome::sent(record, attempts, receipt.message_id);
                }
                Err(err) => err,
            };

            let kind = err.kind();
            if kind == FailureKind::Permanent || attempts >= MAX_ATTEMPTS {
                tracing::warn!(
                    email = %record.email,
                    attempts,
                    error = %err,
                    state = ?RecordState::Failed,
                    "delivery failed"
                );
                return DeliveryOutcome::failed(record, err.to_string(), attempts);
            }

            match &err {
                DeliveryError::QuotaExceeded {
                    retry_after: Some(wait),
                } if *wait > self.policy.max_quota_backoff => {
                    tracing::warn!(
                        email = %record.email,
                        attempts,
                        retry_after_secs = wait.as_secs(),
                        max_secs = self.policy.max_quota_backoff.as_secs(),
                        state = ?RecordState::Failed,
                        "delivery quota exceeded, retry-after too long"
                    );
                    return DeliveryOutcome::failed(
                        record,
                        format!(
                            "quota exceeded, retry-after too long ({}s > {}s)",
                            wait.as_secs(),
                            self.policy.max_quota_backoff.as_secs()
                        ),
                        attempts,
                    );
                }
                DeliveryError::QuotaExceeded { retry_after } => {
                    let delay = retry_after
                        .unwrap_or_else(|| jittered(self.policy.quota_backoff))
                        .min(self.policy.max_quota_backoff);
                    tracing::warn!(
                        email = %record.email,
                        attempt = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "delivery quota exceeded, backing off before retry"
                    );
                    self.limiter.back_off(delay).await;
                }
                _ => {
                    tracing::warn!(
                        email = %record.email,
                        attempt = attempts,
                        error = %err,
                        "transient delivery failure, retrying once"
                    );
                    tokio::time::sleep(self.policy.transient_backoff).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        credential: &AccessToken,
        outbound: &OutboundMessage,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        tokio::time::timeout(
            self.policy.call_timeout,
            self.transport.deliver(credential, outbound),
        )
        .await
        .map_err(|_| DeliveryError::Timeout {
            timeout_ms: u64::try_from(self.policy.call_timeout.as_millis()).unwrap_or(u64::MAX),
        })?
    }
}

/// `base` ±25 %.
fn jittered(base: Duration) -> Duration {
    base.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
