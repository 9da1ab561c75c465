//! Bounded website fetches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, Url};

use crate::error::FetchError;

/// Settings for [`ContentFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// Bytes of body kept per page; anything beyond is dropped.
    pub max_bytes: usize,
    /// Redirect hops followed before the fetch fails.
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "outreach/0.1 (+prospect-research)".to_string(),
            max_bytes: 1_000_000,
            max_redirects: 5,
        }
    }
}

/// Page content as retrieved, possibly truncated to the byte budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// URL after redirects.
    pub url: String,
    pub body: String,
    pub truncated: bool,
}

/// Raw content retrieval capability.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches `url`, giving up after `timeout`.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<RawContent, FetchError>;
}

/// Fetches textual page content for prospect websites.
///
/// Enforces a byte budget (truncate, never fail), a redirect bound, and a
/// caller-supplied timeout covering connect, headers, and body.
pub struct ContentFetcher {
    client: Client,
    max_bytes: usize,
    max_redirects: usize,
}

impl ContentFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
            max_redirects: config.max_redirects,
        })
    }

    async fn fetch_bounded(&self, url: &Url) -> Result<RawContent, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let mut body: Vec<u8> = Vec::with_capacity(self.max_bytes.min(64 * 1024));
        let mut truncated = false;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(url, e))? {
            let remaining = self.max_bytes - body.len();
            if chunk.len() > remaining {
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            url = %final_url,
            bytes = body.len(),
            truncated,
            "fetched website content"
        );

        Ok(RawContent {
            url: final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
            truncated,
        })
    }

    fn classify(&self, url: &Url, err: reqwest::Error) -> FetchError {
        if err.is_redirect() {
            FetchError::TooManyRedirects {
                url: url.to_string(),
                limit: self.max_redirects,
            }
        } else {
            FetchError::Http(err)
        }
    }
}

#[async_trait]
impl ContentSource for ContentFetcher {
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] if the fetch exceeds `timeout`.
    /// - [`FetchError::TooManyRedirects`] past the redirect bound.
    /// - [`FetchError::UnexpectedStatus`] for non-2xx responses.
    /// - [`FetchError::Http`] for DNS, connect, TLS and body read failures.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<RawContent, FetchError> {
        if let Ok(result) = tokio::time::timeout(timeout, self.fetch_bounded(url)).await {
            result
        } else {
            Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }
}
