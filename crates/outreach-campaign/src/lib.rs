//! Campaign execution: turns a batch of prospect records into sent/failed
//! outcomes.
//!
//! The [`Orchestrator`] fans fetch, extract and generate out across records
//! with bounded concurrency (Stage A) and drains finished messages through a
//! single rate-limited dispatcher (Stage B), folding everything into a
//! [`outreach_core::CampaignReport`].

pub mod cancel;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod settings;
pub mod source;

pub use cancel::CancelToken;
pub use error::{AuthError, CampaignError, SourceError};
pub use identity::{CredentialProvider, StaticCredential};
pub use orchestrator::{Orchestrator, Preview};
pub use settings::{CampaignSettings, StageAPolicy};
pub use source::{ColumnMapping, FileRecordSource, RecordSource, SheetValues};
