//! Optional retry for website fetches.
//!
//! Callers normally run with zero retries: a failed fetch degrades the
//! message to a company-name-only personalisation instead. When enabled,
//! only transient failures (timeouts, connection errors, 429, 5xx) are
//! retried.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` if `err` represents a transient condition worth retrying.
///
/// Non-retriable: invalid URLs, redirect loops, and 4xx other than 429.
fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Timeout { .. } => true,
        FetchError::Http(e) => e.is_timeout() || e.is_connect(),
        FetchError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        FetchError::InvalidUrl { .. } | FetchError::TooManyRedirects { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries` times.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-transient error immediately.
///
/// Sleeps `backoff_base_ms * 2^(attempt-1)` (±25 % jitter, capped at 10 s)
/// between attempts. With `max_retries = 0` the operation runs exactly once.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    const MAX_DELAY_MS: u64 = 10_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
