//! Engine configuration.
//!
//! Every section is optional; an empty document reproduces the built-in
//! Turkish/English tables and the default platform limits.
//!
//! ```toml
//! [limits]
//! max_variants = 100
//!
//! [parser]
//! fallback = "multi_rule"
//! assisted_timeout_ms = 5000
//!
//! [dimensions]
//! policy = "require_any"
//! ```

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ColorTable, SizeTable, Vocabulary};

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("size table is empty")]
    EmptySizeTable,

    #[error("size token '{token}' appears more than once")]
    DuplicateSizeToken { token: String },

    #[error("size alias '{alias}' points at unknown token '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("color synonym '{synonym}' belongs to more than one color")]
    DuplicateColorSynonym { synonym: String },
}

/// Numeric caps the validator enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_variants: usize,
    /// Distinct option axes; size and color are two.
    pub max_options: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_price: Decimal,
    pub max_stock: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_variants: 100,
            max_options: 3,
            max_price: Decimal::from(1_000_000),
            max_stock: 1_000_000,
        }
    }
}

/// How many rules the deterministic parser keeps per prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// One price rule and one size-scoped stock rule.
    #[default]
    SingleRule,
    /// Every detected rule.
    MultiRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub fallback: FallbackMode,
    pub assisted_timeout_ms: u64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            fallback: FallbackMode::SingleRule,
            assisted_timeout_ms: 8_000,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn assisted_timeout(&self) -> Duration {
        Duration::from_millis(self.assisted_timeout_ms)
    }
}

/// Labels used when a rule set names no size or no color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub size: String,
    pub color: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            size: "One Size".to_owned(),
            color: "Default".to_owned(),
        }
    }
}

/// Which variant axes a rule set must name before it is expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionPolicy {
    #[default]
    RequireBoth,
    RequireAny,
    /// Expand with placeholders even when nothing was named.
    AllowNone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub policy: DimensionPolicy,
}

/// Immutable configuration injected into [`Engine`](crate::Engine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sizes: SizeTable,
    pub colors: ColorTable,
    pub vocabulary: Vocabulary,
    pub limits: Limits,
    pub parser: ParserOptions,
    pub placeholders: Placeholders,
    pub dimensions: Dimensions,
}

impl EngineConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on syntax errors or invalid tables.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }
}
