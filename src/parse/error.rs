use std::time::Duration;

use thiserror::Error;

/// Why a prompt parser could not produce a rule set.
///
/// Only the assisted strategy fails; [`FallbackParser`](crate::FallbackParser)
/// recovers every variant by scanning the prompt deterministically.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The extraction service refused or could not be reached (quota,
    /// transport, non-success status).
    #[error("extraction service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("extraction timed out after {after:?}")]
    Timeout { after: Duration },

    /// The service answered with something that is not a rule set.
    #[error("malformed extraction payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("extraction returned an empty payload")]
    Empty,
}

impl ParseFailure {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
