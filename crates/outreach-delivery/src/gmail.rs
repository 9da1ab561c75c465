//! Gmail API delivery transport.
//!
//! Messages are assembled as RFC 822 with `lettre`'s builder and sent through
//! the `messages/send` media upload endpoint. When no `From` address is
//! configured, the authenticated account's address is looked up once via the
//! profile endpoint and reused.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::DeliveryError;
use crate::transport::{AccessToken, DeliveryReceipt, DeliveryTransport, OutboundMessage};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/";
const MAX_ERROR_MESSAGE_CHARS: usize = 300;
const QUOTA_REASONS: [&str; 3] = ["rateLimitExceeded", "userRateLimitExceeded", "quotaExceeded"];

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(rename = "emailAddress")]
    email_address: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

/// Client for sending mail through the Gmail API.
///
/// Use [`GmailClient::new`] for production or [`GmailClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GmailClient {
    client: Client,
    base_url: Url,
    from: OnceCell<Mailbox>,
}

impl GmailClient {
    /// # Errors
    ///
    /// Returns [`DeliveryError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`DeliveryError::Message`] if `from` is not a valid
    /// mailbox.
    pub fn new(from: Option<&str>, timeout_secs: u64) -> Result<Self, DeliveryError> {
        Self::with_base_url(from, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`GmailClient::new`], plus [`DeliveryError::Message`] for an
    /// unparsable `base_url`.
    pub fn with_base_url(
        from: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("outreach/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| DeliveryError::Message(format!("invalid base URL '{base_url}': {e}")))?;

        let from = from
            .map(|address| {
                address
                    .parse::<Mailbox>()
                    .map_err(|e| DeliveryError::Message(format!("invalid from address: {e}")))
            })
            .transpose()?;

        Ok(Self {
            client,
            base_url,
            from: OnceCell::new_with(from),
        })
    }

    fn url(&self, path: &str) -> Result<Url, DeliveryError> {
        self.base_url
            .join(path)
            .map_err(|e| DeliveryError::Message(format!("invalid endpoint '{path}': {e}")))
    }

    async fn sender(&self, credential: &AccessToken) -> Result<&Mailbox, DeliveryError> {
        self.from
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(self.url("gmail/v1/users/me/profile")?)
                    .bearer_auth(credential.secret())
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    let headers = response.headers().clone();
                    let body = response.text().await.unwrap_or_default();
                    return Err(classify_failure(status, &headers, &body));
                }
                let profile: ProfileResponse = response.json().await?;
                tracing::debug!(from = %profile.email_address, "resolved sender address from profile");
                profile
                    .email_address
                    .parse::<Mailbox>()
                    .map_err(|e| DeliveryError::Message(format!("invalid profile address: {e}")))
            })
            .await
    }

    fn build_rfc822(from: &Mailbox, message: &OutboundMessage) -> Result<Vec<u8>, DeliveryError> {
        let to = message
            .to
            .trim()
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::InvalidRecipient(format!("{}: {e}", message.to)))?;
        let email = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DeliveryError::Message(e.to_string()))?;
        Ok(email.formatted())
    }
}

#[async_trait]
impl DeliveryTransport for GmailClient {
    async fn deliver(
        &self,
        credential: &AccessToken,
        message: &OutboundMessage,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let from = self.sender(credential).await?;
        let raw = Self::build_rfc822(from, message)?;

        let mut url = self.url("upload/gmail/v1/users/me/messages/send")?;
        url.query_pairs_mut().append_pair("uploadType", "media");

        let response = self
            .client
            .post(url)
            .bearer_auth(credential.secret())
            .header(CONTENT_TYPE, "message/rfc822")
            .body(raw)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &headers, &body));
        }

        // The message is already accepted at this point; an unreadable
        // body only loses the id.
        let message_id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.id);
        tracing::debug!(to = %message.to, message_id = ?message_id, "message accepted by gmail");
        Ok(DeliveryReceipt { message_id })
    }
}

/// Maps a non-2xx Gmail response to a [`DeliveryError`].
fn classify_failure(status: StatusCode, headers: &HeaderMap, body: &str) -> DeliveryError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = if envelope.error.message.is_empty() {
        body.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
    } else {
        envelope.error.message.clone()
    };
    let quota_reason = envelope
        .error
        .errors
        .iter()
        .any(|e| QUOTA_REASONS.contains(&e.reason.as_str()));

    match status.as_u16() {
        429 => DeliveryError::QuotaExceeded {
            retry_after: retry_after(headers),
        },
        403 if quota_reason => DeliveryError::QuotaExceeded {
            retry_after: retry_after(headers),
        },
        400 => DeliveryError::InvalidRecipient(message),
        401 => DeliveryError::Unauthorized(message),
        s if status.is_server_error() => DeliveryError::Unavailable { status: s, message },
        s => DeliveryError::Rejected { status: s, message },
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    parse_retry_after(raw, Utc::now())
}

/// Accepts delta-seconds or an HTTP-date. A date in the past means "now".
fn parse_retry_after(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    match DateTime::parse_from_rfc2822(raw) {
        Ok(at) => Some(
            (at.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or(Duration::ZERO),
        ),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "ignoring unparseable Retry-After header");
            None
        }
    }
}
