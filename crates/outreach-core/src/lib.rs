//! Shared domain types and configuration for the outreach workspace.
//!
//! Holds the prospect/campaign data model, per-stage status enums, the
//! campaign report, and environment-driven application configuration.

pub mod app_config;
pub mod config;
pub mod outcome;
pub mod records;
pub mod sender;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, MIN_SEND_RATE_PER_SEC};
pub use config::{load_app_config, load_app_config_from_env};
pub use outcome::{
    CampaignReport, DeliveryOutcome, DeliveryStatus, ExtractionStatus, GeneratedMessage,
    GenerationStatus, Insight, RecordState, CANCELLED, INVALID_RECORD,
};
pub use records::{dedup_by_email, is_valid_email, CampaignRequest, ProspectRecord, RecordRef};
pub use sender::SenderProfile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
