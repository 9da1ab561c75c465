use std::sync::Arc;
use std::time::Duration;

use outreach_core::{GeneratedMessage, GenerationStatus, Insight, ProspectRecord, SenderProfile};

use crate::error::GenerationError;
use crate::parse::{parse_draft, Draft};
use crate::prompt::build_prompt;
use crate::templates;
use crate::transport::GenerationTransport;

/// Purpose used when the campaign supplies a blank one.
pub const DEFAULT_PURPOSE: &str = "business outreach";

/// Produces one personalized message per prospect.
///
/// Always attempts the generation service once, even when the insight is
/// degraded. On any error, timeout, or unusable response it falls back
/// deterministically to a template tagged `FALLBACK_TEMPLATE`.
pub struct MessageGenerator {
    transport: Arc<dyn GenerationTransport>,
    sender: SenderProfile,
    call_timeout: Duration,
}

impl MessageGenerator {
    #[must_use]
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        sender: SenderProfile,
        call_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            sender,
            call_timeout,
        }
    }

    #[must_use]
    pub fn sender(&self) -> &SenderProfile {
        &self.sender
    }

    /// Never fails.
    pub async fn generate(
        &self,
        prospect: &ProspectRecord,
        insight: &Insight,
        purpose: &str,
    ) -> GeneratedMessage {
        let purpose = match purpose.trim() {
            "" => DEFAULT_PURPOSE,
            p => p,
        };
        let company = prospect.display_company();

        match self.try_generate(prospect, insight, purpose).await {
            Ok(draft) => GeneratedMessage {
                record: insight.record.clone(),
                subject: draft.subject,
                body: draft.body,
                status: GenerationStatus::AiGenerated,
            },
            Err(e) => {
                let draft = if insight.is_usable() {
                    templates::after_generation_failure(company, purpose, &self.sender)
                } else {
                    templates::without_insight(company, purpose, &self.sender)
                };
                tracing::warn!(
                    email = %insight.record.email,
                    extraction_status = ?insight.status,
                    error = %e,
                    "generation failed, using fallback template"
                );
                GeneratedMessage {
                    record: insight.record.clone(),
                    subject: draft.subject,
                    body: draft.body,
                    status: GenerationStatus::FallbackTemplate,
                }
            }
        }
    }

    async fn try_generate(
        &self,
        prospect: &ProspectRecord,
        insight: &Insight,
        purpose: &str,
    ) -> Result<Draft, GenerationError> {
        let prompt = build_prompt(&self.sender, prospect, insight, purpose);
        let text = tokio::time::timeout(self.call_timeout, self.transport.complete(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
            })??;
        parse_draft(&text, &self.sender, prospect.display_company())
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
