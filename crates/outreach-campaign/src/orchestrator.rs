//! Campaign orchestration.
//!
//! Stage A runs fetch → extract → generate for every valid record as one
//! unit of work, at most `concurrency_limit` units at a time. Finished units
//! flow through a channel into Stage B, a single sequential drainer that
//! hands each message to the [`Dispatcher`]. Stage B starts as soon as the
//! first unit is ready.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use outreach_core::{
    dedup_by_email, is_valid_email, CampaignReport, CampaignRequest, DeliveryOutcome,
    ExtractionStatus, GeneratedMessage, Insight, ProspectRecord, RecordRef, RecordState, CANCELLED,
    INVALID_RECORD,
};
use outreach_delivery::{DeliveryLimiter, DeliveryTransport, DispatchPolicy, Dispatcher};
use outreach_scraper::{
    normalize_website_url, retry_with_backoff, ContentSource, FetchError, InsightExtractor,
    RawContent,
};
use outreach_writer::MessageGenerator;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::CampaignError;
use crate::identity::CredentialProvider;
use crate::settings::CampaignSettings;
use crate::source::{ColumnMapping, RecordSource};

/// A validated record waiting for Stage A.
struct Unit {
    record: RecordRef,
    prospect: ProspectRecord,
    url: Url,
}

/// A Stage A result waiting for Stage B.
struct Prepared {
    prospect: ProspectRecord,
    extraction: ExtractionStatus,
    message: GeneratedMessage,
}

/// Generated (but unsent) message for one prospect.
#[derive(Debug, Clone)]
pub struct Preview {
    pub extraction_status: ExtractionStatus,
    pub message: GeneratedMessage,
}

/// Runs campaigns against injected collaborators.
pub struct Orchestrator {
    identity: Arc<dyn CredentialProvider>,
    fetcher: Arc<dyn ContentSource>,
    extractor: InsightExtractor,
    generator: MessageGenerator,
    transport: Arc<dyn DeliveryTransport>,
    dispatch_policy: DispatchPolicy,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        identity: Arc<dyn CredentialProvider>,
        fetcher: Arc<dyn ContentSource>,
        generator: MessageGenerator,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        Self {
            identity,
            fetcher,
            extractor: InsightExtractor::default(),
            generator,
            transport,
            dispatch_policy: DispatchPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: InsightExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    /// Executes one campaign and returns after every record is `SENT` or
    /// `FAILED`.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::InvalidSettings`] before anything runs.
    /// - [`CampaignError::Unauthenticated`] if no credential is available;
    ///   no record is processed.
    pub async fn execute_campaign(
        &self,
        request: &CampaignRequest,
        settings: &CampaignSettings,
        cancel: &CancelToken,
    ) -> Result<CampaignReport, CampaignError> {
        settings.validate()?;
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("campaign", %run_id);
        self.run(run_id, request, settings, cancel)
            .instrument(span)
            .await
    }

    /// Loads records from `source` and executes a campaign over them.
    ///
    /// # Errors
    ///
    /// [`CampaignError::RecordSource`] if loading fails, otherwise as
    /// [`Self::execute_campaign`].
    pub async fn execute_from_source(
        &self,
        source: &dyn RecordSource,
        source_ref: &str,
        mapping: &ColumnMapping,
        purpose: &str,
        settings: &CampaignSettings,
        cancel: &CancelToken,
    ) -> Result<CampaignReport, CampaignError> {
        let records = source.load_records(source_ref, mapping).await?;
        let request = CampaignRequest::new(records, purpose);
        self.execute_campaign(&request, settings, cancel).await
    }

    /// Runs Stage A for one prospect without sending anything.
    ///
    /// # Errors
    ///
    /// [`CampaignError::InvalidRecord`] for a malformed email or website,
    /// [`CampaignError::InvalidSettings`] for unusable settings.
    pub async fn preview(
        &self,
        prospect: &ProspectRecord,
        purpose: &str,
        settings: &CampaignSettings,
    ) -> Result<Preview, CampaignError> {
        settings.validate()?;
        let record = RecordRef {
            position: 1,
            email: prospect.email.trim().to_owned(),
        };
        let url = validate_record(prospect).map_err(CampaignError::InvalidRecord)?;
        let prepared = self
            .prepare(
                Unit {
                    record,
                    prospect: prospect.clone(),
                    url,
                },
                purpose,
                settings,
            )
            .await;
        Ok(Preview {
            extraction_status: prepared.extraction,
            message: prepared.message,
        })
    }

    async fn run(
        &self,
        run_id: Uuid,
        request: &CampaignRequest,
        settings: &CampaignSettings,
        cancel: &CancelToken,
    ) -> Result<CampaignReport, CampaignError> {
        let credential = self.identity.valid_credential().await?;
        let limiter = DeliveryLimiter::new(settings.send_rate_limit, settings.burst)
            .map_err(|e| CampaignError::InvalidSettings(e.to_string()))?;
        let dispatcher = Dispatcher::new(
            Arc::new(limiter),
            Arc::clone(&self.transport),
            self.dispatch_policy.clone(),
        );

        let started = Instant::now();
        let deduped = dedup_by_email(&request.records);
        tracing::info!(
            input = request.records.len(),
            unique = deduped.len(),
            concurrency = settings.concurrency_limit,
            rate = settings.send_rate_limit,
            burst = settings.burst,
            "campaign started"
        );

        let mut outcomes = Vec::with_capacity(deduped.len());
        let mut units = Vec::with_capacity(deduped.len());
        for (record, prospect) in deduped {
            match validate_record(&prospect) {
                Ok(url) => units.push(Unit {
                    record,
                    prospect,
                    url,
                }),
                Err(reason) => {
                    tracing::warn!(
                        email = %record.email,
                        position = record.position,
                        reason = %reason,
                        state = ?RecordState::Failed,
                        "invalid record"
                    );
                    outcomes.push(
                        DeliveryOutcome::failed(&record, INVALID_RECORD, 0)
                            .with_prospect(&prospect.company_name, &prospect.website_url),
                    );
                }
            }
        }

        let roster: Vec<(RecordRef, ProspectRecord)> = units
            .iter()
            .map(|u| (u.record.clone(), u.prospect.clone()))
            .collect();
        let (tx, mut rx) = mpsc::channel::<Prepared>(units.len().max(1));

        let stage_a = async move {
            let mut ready = stream::iter(units)
                .map(|unit| self.prepare(unit, &request.purpose, settings))
                .buffer_unordered(settings.concurrency_limit);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::warn!("cancellation requested, abandoning in-flight units");
                        break;
                    }
                    next = ready.next() => match next {
                        Some(prepared) => {
                            if tx.send(prepared).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        };

        let stage_b = async {
            let mut delivered = Vec::new();
            while let Some(Prepared {
                prospect,
                extraction,
                message,
            }) = rx.recv().await
            {
                let outcome = if cancel.is_cancelled() {
                    tracing::debug!(
                        email = %message.record.email,
                        state = ?RecordState::Failed,
                        "cancelled before sending"
                    );
                    DeliveryOutcome::failed(&message.record, CANCELLED, 0)
                } else {
                    dispatcher.send(&credential, &message).await
                };
                delivered.push(
                    outcome
                        .with_prospect(&prospect.company_name, &prospect.website_url)
                        .with_message(extraction, &message),
                );
            }
            delivered
        };

        let ((), delivered) = tokio::join!(stage_a, stage_b);

        let reached: HashSet<usize> = delivered.iter().map(|o| o.position).collect();
        outcomes.extend(delivered);
        for (record, prospect) in roster {
            if !reached.contains(&record.position) {
                outcomes.push(
                    DeliveryOutcome::failed(&record, CANCELLED, 0)
                        .with_prospect(&prospect.company_name, &prospect.website_url),
                );
            }
        }

        let report = CampaignReport::from_outcomes(
            run_id,
            outcomes,
            started.elapsed().as_secs_f64(),
            cancel.is_cancelled(),
        );
        tracing::info!(
            total = report.total_contacts,
            sent = report.sent_count,
            failed = report.failed_count,
            elapsed_seconds = report.elapsed_seconds,
            cancelled = report.cancelled,
            "campaign finished"
        );
        Ok(report)
    }

    /// Stage A for one record. Never fails: every degradation is folded
    /// into the returned statuses.
    async fn prepare(&self, unit: Unit, purpose: &str, settings: &CampaignSettings) -> Prepared {
        let Unit {
            record,
            prospect,
            url,
        } = unit;
        let mut state = RecordState::Pending;
        advance(&record, &mut state, RecordState::Fetching);

        let policy = &settings.stage_a;
        let backoff_ms = u64::try_from(policy.fetch_retry_backoff.as_millis()).unwrap_or(u64::MAX);
        let fetched = retry_with_backoff(policy.fetch_retries, backoff_ms, || {
            self.fetch_within(&url, settings.fetch_timeout)
        })
        .await;

        let insight = match fetched {
            Ok(raw) => {
                advance(&record, &mut state, RecordState::Extracting);
                let insight = self.extractor.extract(&record, &raw);
                if insight.status == ExtractionStatus::NoContent {
                    tracing::warn!(
                        email = %record.email,
                        url = %raw.url,
                        "website has no usable content, generating without insight"
                    );
                }
                insight
            }
            Err(e) => {
                tracing::warn!(
                    email = %record.email,
                    url = %url,
                    status = ?e.status(),
                    error = %e,
                    "website fetch failed, generating without insight"
                );
                Insight::fetch_failed(record.clone())
            }
        };

        advance(&record, &mut state, RecordState::Generating);
        let message = self.generator.generate(&prospect, &insight, purpose).await;
        advance(&record, &mut state, RecordState::ReadyForDelivery);

        Prepared {
            prospect,
            extraction: insight.status,
            message,
        }
    }

    /// The deadline holds even for sources that never return.
    async fn fetch_within(&self, url: &Url, timeout: Duration) -> Result<RawContent, FetchError> {
        match tokio::time::timeout(timeout, self.fetcher.fetch(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn advance(record: &RecordRef, state: &mut RecordState, next: RecordState) {
    debug_assert!(state.can_advance_to(next), "{state:?} -> {next:?}");
    tracing::debug!(email = %record.email, from = ?*state, to = ?next, "record state");
    *state = next;
}

/// Returns the normalised website URL, or why the record is unusable.
fn validate_record(prospect: &ProspectRecord) -> Result<Url, String> {
    if !is_valid_email(&prospect.email) {
        return Err(format!("malformed email '{}'", prospect.email));
    }
    normalize_website_url(&prospect.website_url).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
