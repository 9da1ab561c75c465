//! Website URL normalisation for prospect records.

use reqwest::Url;

use crate::error::FetchError;

/// Normalises a prospect's website column into a fetchable URL.
///
/// Bare domains (`acme.com`, `www.acme.com/about`) get `https://` prepended.
/// Only `http`/`https` URLs with a host are accepted.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for empty input, unsupported schemes,
/// unparsable URLs, or URLs without a host.
pub fn normalize_website_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url: raw.to_owned(),
        reason: reason.to_owned(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_owned()
    } else if lower.contains("://") {
        return Err(invalid("unsupported scheme"));
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host")),
    }
}
