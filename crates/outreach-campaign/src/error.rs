use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no delivery credential is configured")]
    MissingCredential,

    #[error("credential could not be refreshed: {0}")]
    Refresh(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read record source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse record source {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("record source has no header row")]
    MissingHeader,

    #[error("column '{column}' not found; available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

/// Whole-run failures. None of these carry a partial report.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("record source failed: {0}")]
    RecordSource(#[from] SourceError),

    #[error("invalid campaign settings: {0}")]
    InvalidSettings(String),

    #[error("invalid prospect record: {0}")]
    InvalidRecord(String),
}
