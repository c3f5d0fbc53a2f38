//! Prompt parsing: free text in, canonical [`RuleSet`] out.
//!
//! Two strategies share the [`PromptParser`] capability. The assisted one
//! asks an external [`ExtractionService`] and may fail; the deterministic one
//! scans the prompt locally and never does. [`FallbackParser`] composes them.

mod assisted;
mod error;
mod fallback;
#[cfg(feature = "http")]
mod http;
mod lexer;

use async_trait::async_trait;

pub use assisted::{
    AssistedParser, ExtractionRequest, ExtractionService, FallbackParser, EXTRACTION_INSTRUCTION,
};
pub use error::ParseFailure;
pub use fallback::DeterministicParser;
#[cfg(feature = "http")]
pub use http::HttpExtractor;

use crate::types::RuleSet;

/// Turns a merchant prompt into a rule set.
#[async_trait]
pub trait PromptParser: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ParseFailure`] when the strategy cannot produce a rule set.
    async fn parse(&self, prompt: &str) -> Result<RuleSet, ParseFailure>;
}
