//! Builds the production collaborators from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use outreach_campaign::{Orchestrator, StaticCredential};
use outreach_core::AppConfig;
use outreach_delivery::{DispatchPolicy, GmailClient};
use outreach_scraper::{ContentFetcher, FetcherConfig};
use outreach_writer::{GeminiClient, MessageGenerator};

pub(crate) fn fetcher_config(config: &AppConfig) -> FetcherConfig {
    FetcherConfig {
        user_agent: config.fetch_user_agent.clone(),
        max_bytes: config.fetch_max_bytes,
        max_redirects: config.fetch_max_redirects,
    }
}

pub(crate) fn dispatch_policy(config: &AppConfig) -> DispatchPolicy {
    DispatchPolicy {
        quota_backoff: Duration::from_millis(config.quota_backoff_ms),
        call_timeout: Duration::from_secs(config.delivery_timeout_secs),
        max_quota_backoff: Duration::from_secs(config.max_quota_backoff_secs),
        ..DispatchPolicy::default()
    }
}

/// # Errors
///
/// Returns an error if any HTTP client cannot be constructed or the
/// configured `From` address is not a valid mailbox.
pub(crate) fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let fetcher = ContentFetcher::new(&fetcher_config(config))?;
    let gemini = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        config.generation_timeout_secs,
    )?;
    let generator = MessageGenerator::new(
        Arc::new(gemini),
        config.sender.clone(),
        Duration::from_secs(config.generation_timeout_secs),
    );
    let gmail = GmailClient::new(config.from_address.as_deref(), config.delivery_timeout_secs)?;
    let identity = StaticCredential::new(config.gmail_access_token.as_deref());

    Ok(
        Orchestrator::new(Arc::new(identity), Arc::new(fetcher), generator, Arc::new(gmail))
            .with_dispatch_policy(dispatch_policy(config)),
    )
}
