use thiserror::Error;

/// Errors from the generation path. Every variant is recoverable: the
/// generator answers all of them with a fallback template.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The generation service answered with a non-2xx status.
    #[error("generation service returned HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered but produced no usable text.
    #[error("generation service returned an empty response")]
    EmptyResponse,

    /// The call did not finish within its per-call timeout.
    #[error("generation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Client construction failed (bad base URL).
    #[error("invalid generation client configuration: {0}")]
    Config(String),
}
