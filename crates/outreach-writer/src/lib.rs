//! Personalized outreach message generation.
//!
//! [`MessageGenerator`] turns a prospect record, its website [`Insight`] and
//! the campaign purpose into a [`GeneratedMessage`]. Generation goes through
//! a [`GenerationTransport`] (production: [`GeminiClient`]); any transport
//! failure, timeout, or unusable response falls back to a built-in template
//! so a message is always produced.
//!
//! [`Insight`]: outreach_core::Insight
//! [`GeneratedMessage`]: outreach_core::GeneratedMessage

pub mod error;
pub mod gemini;
pub mod generator;
pub mod transport;

mod parse;
mod prompt;
mod templates;

pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use generator::{MessageGenerator, DEFAULT_PURPOSE};
pub use transport::GenerationTransport;
