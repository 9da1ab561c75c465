//! Token-bucket gate for outbound sends.
//!
//! Capacity `burst`, refilled continuously at `rate` tokens per second. The
//! bucket state sits behind an async mutex that `acquire` holds while it
//! waits, so callers are served in arrival order and the ceiling of
//! `burst + rate * t` permits by time `t` holds even with concurrent callers.

use std::time::Duration;

use outreach_core::MIN_SEND_RATE_PER_SEC;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::LimiterConfigError;

/// Longest pause [`DeliveryLimiter::back_off`] will impose.
pub const MAX_BACK_OFF: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Bucket {
    rate: f64,
    burst: f64,
    tokens: f64,
    /// Refill accrues from this instant. May lie in the future after a
    /// back-off, in which case nothing accrues until then.
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant) {
        if now > self.last_refill {
            let elapsed = now.duration_since(self.last_refill).as_secs_f64();
            self.tokens = (self.tokens + elapsed * self.rate).min(self.burst);
            self.last_refill = now;
        }
    }

    fn per_token(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate)
    }
}

/// Proof that one send may proceed.
#[derive(Debug)]
#[must_use]
pub struct DeliveryPermit {
    granted_at: Instant,
}

impl DeliveryPermit {
    #[must_use]
    pub fn granted_at(&self) -> Instant {
        self.granted_at
    }
}

/// Token bucket bounding the delivery rate. Delays callers, never drops them.
#[derive(Debug)]
pub struct DeliveryLimiter {
    bucket: Mutex<Bucket>,
}

fn validate(rate: f64, burst: u32) -> Result<(), LimiterConfigError> {
    if !rate.is_finite() || rate < MIN_SEND_RATE_PER_SEC {
        return Err(LimiterConfigError(format!(
            "rate must be at least {MIN_SEND_RATE_PER_SEC} per second, got {rate}"
        )));
    }
    if burst == 0 {
        return Err(LimiterConfigError("burst must be at least 1".to_owned()));
    }
    Ok(())
}

impl DeliveryLimiter {
    /// Creates a full bucket.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterConfigError`] if `rate` is not finite or lies below
    /// [`MIN_SEND_RATE_PER_SEC`], or if `burst` is zero.
    pub fn new(rate: f64, burst: u32) -> Result<Self, LimiterConfigError> {
        validate(rate, burst)?;
        Ok(Self {
            bucket: Mutex::new(Bucket {
                rate,
                burst: f64::from(burst),
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
        })
    }

    /// Changes rate and capacity. Tokens already earned are kept up to the
    /// new capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterConfigError`] for the same inputs [`Self::new`]
    /// rejects; the bucket is left unchanged.
    pub async fn configure(&self, rate: f64, burst: u32) -> Result<(), LimiterConfigError> {
        validate(rate, burst)?;
        let mut bucket = self.bucket.lock().await;
        bucket.refill(Instant::now());
        bucket.rate = rate;
        bucket.burst = f64::from(burst);
        bucket.tokens = bucket.tokens.min(bucket.burst);
        tracing::debug!(rate, burst, "delivery limiter reconfigured");
        Ok(())
    }

    /// Waits until a token is available and takes it.
    pub async fn acquire(&self) -> DeliveryPermit {
        let mut bucket = self.bucket.lock().await;
        loop {
            let now = Instant::now();
            bucket.refill(now);
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                return DeliveryPermit { granted_at: now };
            }
            let deficit = 1.0 - bucket.tokens;
            let wait = Duration::from_secs_f64(deficit / bucket.rate);
            let ready_at = bucket.last_refill.max(now) + wait;
            tokio::time::sleep_until(ready_at).await;
        }
    }

    /// Empties the bucket so the next permit is granted no sooner than
    /// `delay` from now, capped at [`MAX_BACK_OFF`]. A longer pause already
    /// in force is kept.
    pub async fn back_off(&self, delay: Duration) {
        let delay = delay.min(MAX_BACK_OFF);
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        bucket.refill(now);
        bucket.tokens = 0.0;
        let resume = now
            .checked_add(delay)
            .and_then(|t| t.checked_sub(bucket.per_token()))
            .map_or(now, |t| t.max(now));
        bucket.last_refill = bucket.last_refill.max(resume);
        tracing::debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "delivery limiter backing off"
        );
    }
}
