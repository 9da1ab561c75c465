use std::time::Duration;

use outreach_core::{AppConfig, MIN_SEND_RATE_PER_SEC};

use crate::error::CampaignError;

/// Stage A retry policy. With `fetch_retries = 0` a failed fetch degrades
/// the message immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAPolicy {
    pub fetch_retries: u32,
    /// Base delay before the first fetch retry; doubles per attempt.
    pub fetch_retry_backoff: Duration,
}

impl Default for StageAPolicy {
    fn default() -> Self {
        Self {
            fetch_retries: 0,
            fetch_retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Per-run knobs for [`crate::Orchestrator::execute_campaign`].
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSettings {
    /// Simultaneous Stage A units.
    pub concurrency_limit: usize,
    /// Delivery tokens refilled per second.
    pub send_rate_limit: f64,
    /// Token bucket capacity.
    pub burst: u32,
    /// Per-unit fetch timeout.
    pub fetch_timeout: Duration,
    pub stage_a: StageAPolicy,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            send_rate_limit: 1.0,
            burst: 3,
            fetch_timeout: Duration::from_secs(30),
            stage_a: StageAPolicy::default(),
        }
    }
}

impl CampaignSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            concurrency_limit: config.max_concurrent_units,
            send_rate_limit: config.send_rate_per_sec,
            burst: config.send_burst,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            stage_a: StageAPolicy {
                fetch_retries: config.fetch_retries,
                ..StageAPolicy::default()
            },
        }
    }

    /// # Errors
    ///
    /// Returns [`CampaignError::InvalidSettings`] for a zero concurrency
    /// limit, burst, or fetch timeout, or a rate that is not finite or lies
    /// below [`MIN_SEND_RATE_PER_SEC`].
    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.concurrency_limit == 0 {
            return Err(CampaignError::InvalidSettings(
                "concurrency_limit must be at least 1".to_owned(),
            ));
        }
        if !self.send_rate_limit.is_finite() || self.send_rate_limit < MIN_SEND_RATE_PER_SEC {
            return Err(CampaignError::InvalidSettings(format!(
                "send_rate_limit must be at least {MIN_SEND_RATE_PER_SEC}, got {}",
                self.send_rate_limit
            )));
        }
        if self.burst == 0 {
            return Err(CampaignError::InvalidSettings(
                "burst must be at least 1".to_owned(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(CampaignError::InvalidSettings(
                "fetch_timeout must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CampaignSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_values() {
        let cases = [
            CampaignSettings {
                concurrency_limit: 0,
                ..CampaignSettings::default()
            },
            CampaignSettings {
                send_rate_limit: 0.0,
                ..CampaignSettings::default()
            },
            CampaignSettings {
                send_rate_limit: f64::INFINITY,
                ..CampaignSettings::default()
            },
            CampaignSettings {
                send_rate_limit: 1e-20,
                ..CampaignSettings::default()
            },
            CampaignSettings {
                burst: 0,
                ..CampaignSettings::default()
            },
            CampaignSettings {
                fetch_timeout: Duration::ZERO,
                ..CampaignSettings::default()
            },
        ];
        for settings in cases {
            assert!(
                matches!(settings.validate(), Err(CampaignError::InvalidSettings(_))),
                "{settings:?} should be rejected"
            );
        }
    }
}
