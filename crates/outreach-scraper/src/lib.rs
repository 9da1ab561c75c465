//! Website content retrieval and insight extraction for prospect records.
//!
//! [`ContentFetcher`] pulls a bounded amount of page content for a prospect's
//! website; [`InsightExtractor`] reduces it to a compact summary the message
//! writer can use as context.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod retry;
pub mod website;

mod html;

pub use error::FetchError;
pub use extract::{InsightExtractor, PageSignals};
pub use fetch::{ContentFetcher, ContentSource, FetcherConfig, RawContent};
pub use retry::retry_with_backoff;
pub use website::normalize_website_url;
