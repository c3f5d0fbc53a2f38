//! Deterministic variant rule engine.
//!
//! A merchant prompt ("S to XL, red and blue, price 200, XL and above +%10")
//! is parsed into a [`RuleSet`], expanded into an ordered list of priced and
//! stocked [`Variant`]s, and validated against platform limits.

mod config;
mod engine;
mod error;
mod expand;
mod matcher;
mod parse;
mod types;
mod validate;

pub use config::{
    ConfigError, DimensionPolicy, Dimensions, EngineConfig, FallbackMode, Limits, ParserOptions,
    Placeholders,
};
pub use engine::{Engine, Expansion};
pub use error::VarigenError;
pub use matcher::{
    default_strategies, AnalyzedCondition, ColorMatch, ConditionMatcher, ConditionStrategy,
    EmbeddedToken, ExactSize, OpenRange, Target, Universal,
};
pub use parse::{
    AssistedParser, DeterministicParser, ExtractionRequest, ExtractionService, FallbackParser,
    ParseFailure, PromptParser, EXTRACTION_INSTRUCTION,
};
#[cfg(feature = "http")]
pub use parse::HttpExtractor;
pub use types::{
    fold, words, Adjustment, ColorEntry, ColorTable, CompareRule, Dimension, ExpansionReport,
    Lexicon, PriceRule, ProblemKind, RuleSet, RuleSetBuilder, SizeTable, StockRule, StockSource,
    UnknownSizeToken, ValidationErrors, ValidationProblem, Variant, VariantId, VariantKey,
    VariantOverride, VariantTrace, Vocabulary,
};
