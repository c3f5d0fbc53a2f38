use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// A size range bound that is not in the ordinal table.
///
/// Callers recover by using the full table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown size token '{token}'")]
pub struct UnknownSizeToken {
    token: String,
}

impl UnknownSizeToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// A variant axis the prompt must name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Size,
    Color,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Size => write!(f, "sizes"),
            Dimension::Color => write!(f, "colors"),
        }
    }
}

/// Coarse classification of a [`ValidationProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    MissingRequiredDimension,
    LimitExceeded,
    DuplicateVariant,
    InvalidCompareAtPrice,
}

/// One reason a variant list (or the rule set behind it) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationProblem {
    #[error("no {dimension} found in the prompt; {}", guidance(.dimension))]
    MissingRequiredDimension { dimension: Dimension },

    #[error("variant count {actual} exceeds the limit of {cap}")]
    TooManyVariants { actual: usize, cap: usize },

    #[error("option count {actual} exceeds the limit of {cap}")]
    TooManyOptions { actual: usize, cap: usize },

    #[error("variant '{variant}' price {price} is outside 0..={max}")]
    PriceOutOfBounds {
        variant: String,
        price: Decimal,
        max: Decimal,
    },

    #[error("variant '{variant}' stock {stock} is outside 0..={max}")]
    StockOutOfBounds {
        variant: String,
        stock: i64,
        max: i64,
    },

    #[error("duplicate variant '{duplicate}' (same key as '{first}')")]
    DuplicateVariant { first: String, duplicate: String },

    #[error(
        "variant '{variant}' compare-at price {compare_at_price} must be greater than price {price}"
    )]
    InvalidCompareAtPrice {
        variant: String,
        price: Decimal,
        compare_at_price: Decimal,
    },
}

fn guidance(dimension: &Dimension) -> &'static str {
    match dimension {
        Dimension::Size => "name the sizes, e.g. \"S'den XL'e kadar\" or \"S, M, L\"",
        Dimension::Color => "name at least one color, e.g. \"kırmızı ve mavi\"",
    }
}

impl ValidationProblem {
    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        match self {
            ValidationProblem::MissingRequiredDimension { .. } => {
                ProblemKind::MissingRequiredDimension
            }
            ValidationProblem::TooManyVariants { .. }
            | ValidationProblem::TooManyOptions { .. }
            | ValidationProblem::PriceOutOfBounds { .. }
            | ValidationProblem::StockOutOfBounds { .. } => ProblemKind::LimitExceeded,
            ValidationProblem::DuplicateVariant { .. } => ProblemKind::DuplicateVariant,
            ValidationProblem::InvalidCompareAtPrice { .. } => ProblemKind::InvalidCompareAtPrice,
        }
    }
}

/// Every problem found in one validation pass.
///
/// Never empty: a pass with no problems is `Ok(())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    problems: Vec<ValidationProblem>,
}

impl ValidationErrors {
    pub(crate) fn from_problems(problems: Vec<ValidationProblem>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Self { problems })
        }
    }

    #[must_use]
    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Whether any problem is of the given kind.
    #[must_use]
    pub fn has(&self, kind: ProblemKind) -> bool {
        self.problems.iter().any(|p| p.kind() == kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.problems.len();
        write!(f, "{n} validation problem{}:", if n == 1 { "" } else { "s" })?;
        for problem in &self.problems {
            write!(f, "\n  - {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_size_token_message() {
        let err = UnknownSizeToken::new("7XL");
        assert_eq!(err.to_string(), "unknown size token '7XL'");
    }

    #[test]
    fn too_many_variants_message() {
        let err = ValidationProblem::TooManyVariants {
            actual: 108,
            cap: 100,
        };
        assert_eq!(err.to_string(), "variant count 108 exceeds the limit of 100");
        assert_eq!(err.kind(), ProblemKind::LimitExceeded);
    }

    #[test]
    fn invalid_compare_at_message() {
        let err = ValidationProblem::InvalidCompareAtPrice {
            variant: "M / Red".into(),
            price: Decimal::new(5000, 2),
            compare_at_price: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "variant 'M / Red' compare-at price 50.00 must be greater than price 50.00"
        );
    }

    #[test]
    fn duplicate_message() {
        let err = ValidationProblem::DuplicateVariant {
            first: "L / Red".into(),
            duplicate: "l / red".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate variant 'l / red' (same key as 'L / Red')"
        );
    }

    #[test]
    fn missing_dimension_message() {
        let err = ValidationProblem::MissingRequiredDimension {
            dimension: Dimension::Color,
        };
        assert!(err.to_string().starts_with("no colors found in the prompt;"));
    }

    #[test]
    fn aggregated_display_lists_every_problem() {
        let err = ValidationErrors::from_problems(vec![
            ValidationProblem::TooManyVariants {
                actual: 108,
                cap: 100,
            },
            ValidationProblem::TooManyOptions { actual: 4, cap: 3 },
        ])
        .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("2 validation problems:"));
        assert!(text.contains("variant count 108"));
        assert!(text.contains("option count 4"));
        assert!(err.has(ProblemKind::LimitExceeded));
        assert!(!err.has(ProblemKind::DuplicateVariant));
    }

    #[test]
    fn empty_problem_list_is_ok() {
        assert!(ValidationErrors::from_problems(Vec::new()).is_ok());
    }
}
