use std::fmt;

use async_trait::async_trait;
use outreach_core::GeneratedMessage;

use crate::error::DeliveryError;

/// Bearer credential for the delivery service. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl From<&GeneratedMessage> for OutboundMessage {
    fn from(message: &GeneratedMessage) -> Self {
        Self {
            to: message.record.email.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned id, when the provider reports one.
    pub message_id: Option<String>,
}

/// Raw message-delivery capability.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn deliver(
        &self,
        credential: &AccessToken,
        message: &OutboundMessage,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
