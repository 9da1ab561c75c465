//! Per-stage results and the aggregated campaign report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::RecordRef;

/// `error_detail` for records rejected before any stage runs.
pub const INVALID_RECORD: &str = "invalid_record";
/// `error_detail` for records abandoned by run-level cancellation.
pub const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionStatus {
    Ok,
    /// Page fetched but carried no usable visible text.
    NoContent,
    /// Fetch errored or timed out; nothing is known about the website.
    FetchFailed,
}

/// Summary of a prospect's website used as generation context.
///
/// Owned by the pipeline run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub record: RecordRef,
    pub summary: String,
    pub status: ExtractionStatus,
}

impl Insight {
    #[must_use]
    pub fn fetch_failed(record: RecordRef) -> Self {
        Self {
            record,
            summary: String::new(),
            status: ExtractionStatus::FetchFailed,
        }
    }

    #[must_use]
    pub fn no_content(record: RecordRef) -> Self {
        Self {
            record,
            summary: String::new(),
            status: ExtractionStatus::NoContent,
        }
    }

    /// Only an `Ok` insight may be quoted back to the prospect.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.status == ExtractionStatus::Ok && !self.summary.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    AiGenerated,
    FallbackTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMessage {
    pub record: RecordRef,
    pub subject: String,
    pub body: String,
    pub status: GenerationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Lifecycle of one record through the pipeline.
///
/// Stage A: `Pending → Fetching → Extracting → Generating → ReadyForDelivery`.
/// Stage B: `ReadyForDelivery → Sending → {Sent | Retrying → {Sent | Failed}}`.
/// Any non-terminal state may jump to `Failed` (invalid record, cancellation,
/// permanent delivery error). No state is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordState {
    Pending,
    Fetching,
    Extracting,
    Generating,
    ReadyForDelivery,
    Sending,
    Retrying,
    Sent,
    Failed,
}

impl RecordState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    /// Whether `self → next` is an edge of the record state machine.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use RecordState::{
            Extracting, Failed, Fetching, Generating, Pending, ReadyForDelivery, Retrying, Sending,
            Sent,
        };
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Extracting | Generating)
                | (Extracting, Generating)
                | (Generating, ReadyForDelivery)
                | (ReadyForDelivery, Sending)
                | (Sending | Retrying, Sent)
                | (Sending, Retrying)
                | (_, Failed)
        )
    }
}

/// Final per-record result, one per de-duplicated input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub position: usize,
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website_url: String,
    pub status: DeliveryStatus,
    pub error_detail: Option<String>,
    pub attempted_at: DateTime<Utc>,
    /// Number of delivery attempts made (0 if the record never reached Stage B).
    pub attempts: u32,
    pub extraction_status: Option<ExtractionStatus>,
    pub generation_status: Option<GenerationStatus>,
    pub subject: Option<String>,
    pub message_id: Option<String>,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn sent(record: &RecordRef, attempts: u32, message_id: Option<String>) -> Self {
        Self::new(record, DeliveryStatus::Sent, None, attempts, message_id)
    }

    #[must_use]
    pub fn failed(record: &RecordRef, detail: impl Into<String>, attempts: u32) -> Self {
        Self::new(
            record,
            DeliveryStatus::Failed,
            Some(detail.into()),
            attempts,
            None,
        )
    }

    fn new(
        record: &RecordRef,
        status: DeliveryStatus,
        error_detail: Option<String>,
        attempts: u32,
        message_id: Option<String>,
    ) -> Self {
        Self {
            position: record.position,
            email: record.email.clone(),
            company_name: String::new(),
            website_url: String::new(),
            status,
            error_detail,
            attempted_at: Utc::now(),
            attempts,
            extraction_status: None,
            generation_status: None,
            subject: None,
            message_id,
        }
    }

    #[must_use]
    pub fn with_prospect(mut self, company_name: &str, website_url: &str) -> Self {
        company_name.clone_into(&mut self.company_name);
        website_url.clone_into(&mut self.website_url);
        self
    }

    #[must_use]
    pub fn with_message(
        mut self,
        extraction_status: ExtractionStatus,
        message: &GeneratedMessage,
    ) -> Self {
        self.extraction_status = Some(extraction_status);
        self.generation_status = Some(message.status);
        self.subject = Some(message.subject.clone());
        self
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// Aggregated result of one campaign run, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub run_id: Uuid,
    pub total_contacts: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub elapsed_seconds: f64,
    pub cancelled: bool,
    /// Ordered by input position.
    pub per_contact: Vec<DeliveryOutcome>,
}

impl CampaignReport {
    /// Folds outcomes into a report, restoring input order.
    #[must_use]
    pub fn from_outcomes(
        run_id: Uuid,
        mut outcomes: Vec<DeliveryOutcome>,
        elapsed_seconds: f64,
        cancelled: bool,
    ) -> Self {
        outcomes.sort_by_key(|o| o.position);
        let sent_count = outcomes.iter().filter(|o| o.is_sent()).count();
        Self {
            run_id,
            total_contacts: outcomes.len(),
            sent_count,
            failed_count: outcomes.len() - sent_count,
            elapsed_seconds,
            cancelled,
            per_contact: outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(position: usize, email: &str) -> RecordRef {
        RecordRef {
            position,
            email: email.to_owned(),
        }
    }

    #[test]
    fn report_restores_input_order_and_counts() {
        let outcomes = vec![
            DeliveryOutcome::sent(&rec(3, "c@x.com"), 1, Some("m3".into())),
            DeliveryOutcome::failed(&rec(1, "a@x.com"), INVALID_RECORD, 0),
            DeliveryOutcome::sent(&rec(2, "b@x.com"), 2, None),
        ];
        let report = CampaignReport::from_outcomes(Uuid::new_v4(), outcomes, 1.25, false);

        assert_eq!(report.total_contacts, 3);
        assert_eq!(report.sent_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.sent_count + report.failed_count, report.total_contacts);
        let positions: Vec<usize> = report.per_contact.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn failed_outcome_carries_detail() {
        let outcome = DeliveryOutcome::failed(&rec(1, "a@x.com"), CANCELLED, 0);
        assert_eq!(outcome.status, DeliveryStatus::Failed);
        assert_eq!(outcome.error_detail.as_deref(), Some("cancelled"));
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn state_machine_allows_only_forward_edges() {
        use RecordState::*;
        assert!(Pending.can_advance_to(Fetching));
        assert!(Fetching.can_advance_to(Generating));
        assert!(Sending.can_advance_to(Retrying));
        assert!(Retrying.can_advance_to(Sent));
        assert!(Generating.can_advance_to(Failed));
        assert!(!Retrying.can_advance_to(Retrying));
        assert!(!ReadyForDelivery.can_advance_to(Fetching));
        assert!(!Sent.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Sending));
    }

    #[test]
    fn statuses_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&GenerationStatus::FallbackTemplate).unwrap();
        assert_eq!(json, "\"FALLBACK_TEMPLATE\"");
        let json = serde_json::to_string(&ExtractionStatus::FetchFailed).unwrap();
        assert_eq!(json, "\"FETCH_FAILED\"");
    }

    #[test]
    fn insight_usable_only_when_ok() {
        let r = rec(1, "a@x.com");
        assert!(!Insight::fetch_failed(r.clone()).is_usable());
        assert!(!Insight::no_content(r.clone()).is_usable());
        let ok = Insight {
            record: r,
            summary: "Acme builds rockets".into(),
            status: ExtractionStatus::Ok,
        };
        assert!(ok.is_usable());
    }
}
