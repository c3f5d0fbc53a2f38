use thiserror::Error;

use crate::config::ConfigError;
use crate::parse::ParseFailure;
use crate::types::{ValidationErrors, VariantId};

/// Unified error type covering configuration, parsing and validation.
///
/// Returned by [`Engine::apply_overrides()`](crate::Engine::apply_overrides);
/// every layer's own error converts into it with `?`.
#[derive(Debug, Error)]
pub enum VarigenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Rejected(#[from] ValidationErrors),

    #[error("no variant with id '{id}'")]
    UnknownVariant { id: VariantId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_errors_convert() {
        let err: VarigenError = ConfigError::EmptySizeTable.into();
        assert_eq!(err.to_string(), "size table is empty");

        let err: VarigenError = ParseFailure::Empty.into();
        assert!(matches!(err, VarigenError::Parse(ParseFailure::Empty)));
    }
}
