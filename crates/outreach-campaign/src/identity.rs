//! Credential capability consumed by the orchestrator.

use async_trait::async_trait;
use outreach_delivery::AccessToken;

use crate::error::AuthError;

/// Hands out a delivery credential that is valid right now.
///
/// Implementations own refresh and revocation; the orchestrator asks once
/// per run, before any record is processed.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn valid_credential(&self) -> Result<AccessToken, AuthError>;
}

/// A pre-issued bearer token, e.g. from `GMAIL_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticCredential {
    token: Option<AccessToken>,
}

impl StaticCredential {
    /// Blank tokens count as absent.
    #[must_use]
    pub fn new(token: Option<&str>) -> Self {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn valid_credential(&self) -> Result<AccessToken, AuthError> {
        self.token.clone().ok_or(AuthError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn present_token_is_returned() {
        let provider = StaticCredential::new(Some(" ya29.abc "));
        let token = provider.valid_credential().await.unwrap();
        assert_eq!(token.secret(), "ya29.abc");
    }

    #[tokio::test]
    async fn missing_or_blank_token_is_an_auth_error() {
        for token in [None, Some(""), Some("   ")] {
            let err = StaticCredential::new(token)
                .valid_credential()
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::MissingCredential));
        }
    }
}
