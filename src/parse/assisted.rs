//! Assisted extraction: an external text-understanding service fills in the
//! rule set, the local tables normalize it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ParseFailure;
use super::fallback::DeterministicParser;
use super::PromptParser;
use crate::types::{fold, Adjustment, Lexicon, RuleSet, RuleSetBuilder};

/// Fixed instruction sent with every prompt. Describes the JSON object the
/// service must return.
pub const EXTRACTION_INSTRUCTION: &str = "\
Extract a product variant rule set from the merchant's text. Reply with one JSON object and \
nothing else, using exactly these keys:
  sizes: array of size tokens (XS, S, M, L, XL, 2XL, 3XL, 4XL, 5XL); expand ranges such as \"S to XL\"
  colors: array of color names as the merchant wrote them; never invent a color
  basePrice: number or null
  priceRules: array of {condition, increaseAbs | decreaseAbs | increasePct | decreasePct}, exactly one amount key per rule
  compareAtPrice: number or null
  compareAtPriceRules: array of {condition, value}
  defaultStock: integer or null
  stockRules: array of {condition, quantity}
Conditions are short phrases copied from the text, such as \"XL ve üzeri\", \"red\" or \"all\". \
Use empty arrays and nulls for anything the text does not mention.";

/// What the service is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub prompt: String,
    pub instruction: &'static str,
}

impl ExtractionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            instruction: EXTRACTION_INSTRUCTION,
        }
    }
}

/// External structured-extraction service. One round trip per prompt;
/// returns the raw JSON text of the reply.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ParseFailure::Unavailable`] for transport, quota or status
    /// failures.
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ParseFailure>;
}

#[async_trait]
impl<S: ExtractionService + ?Sized> ExtractionService for Arc<S> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ParseFailure> {
        (**self).extract(request).await
    }
}

#[async_trait]
impl<S: ExtractionService + ?Sized> ExtractionService for Box<S> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ParseFailure> {
        (**self).extract(request).await
    }
}

// -- Wire payload -----------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Payload {
    sizes: Option<Vec<String>>,
    colors: Option<Vec<String>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    base_price: Option<Decimal>,
    price_rules: Option<Vec<PriceRulePayload>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    compare_at_price: Option<Decimal>,
    compare_at_price_rules: Option<Vec<CompareRulePayload>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    default_stock: Option<Decimal>,
    stock_rules: Option<Vec<StockRulePayload>>,
}

/// Either `{condition, increasePct: 10}` or `{condition, type: "increasePct",
/// amount: 10}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceRulePayload {
    condition: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    increase_abs: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    decrease_abs: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    increase_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    decrease_pct: Option<Decimal>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    amount: Option<Decimal>,
}

impl PriceRulePayload {
    fn adjustment(&self) -> Option<Adjustment> {
        let keyed: Vec<Adjustment> = [
            self.increase_abs.map(Adjustment::IncreaseAbs),
            self.decrease_abs.map(Adjustment::DecreaseAbs),
            self.increase_pct.map(Adjustment::IncreasePct),
            self.decrease_pct.map(Adjustment::DecreasePct),
        ]
        .into_iter()
        .flatten()
        .collect();
        match keyed.as_slice() {
            [one] => Some(*one),
            [] => {
                let amount = self.amount?;
                match self.kind.as_deref()? {
                    "increaseAbs" => Some(Adjustment::IncreaseAbs(amount)),
                    "decreaseAbs" => Some(Adjustment::DecreaseAbs(amount)),
                    "increasePct" => Some(Adjustment::IncreasePct(amount)),
                    "decreasePct" => Some(Adjustment::DecreasePct(amount)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompareRulePayload {
    condition: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    value: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StockRulePayload {
    condition: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    quantity: Option<Decimal>,
}

/// Models like to wrap JSON in Markdown fences.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn quantity(value: Decimal) -> Option<u32> {
    if value.is_sign_negative() {
        return None;
    }
    value.trunc().to_u32()
}

/// Rule set extraction through an [`ExtractionService`], bounded by a
/// timeout.
pub struct AssistedParser<S> {
    service: S,
    lexicon: Arc<Lexicon>,
    timeout: Duration,
}

impl<S: ExtractionService> AssistedParser<S> {
    pub fn new(service: S, lexicon: Arc<Lexicon>, timeout: Duration) -> Self {
        Self {
            service,
            lexicon,
            timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decode a service reply into a normalized rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::Empty`] for a blank reply and
    /// [`ParseFailure::Malformed`] when it is not a rule set object.
    pub fn decode(&self, raw: &str) -> Result<RuleSet, ParseFailure> {
        let body = strip_fences(raw);
        if body.is_empty() {
            return Err(ParseFailure::Empty);
        }
        let payload: Payload = serde_json::from_str(body)?;
        Ok(self.normalize(payload))
    }

    fn normalize(&self, payload: Payload) -> RuleSet {
        let table = &self.lexicon.sizes;
        let mut sizes: Vec<&str> = Vec::new();
        for raw in payload.sizes.iter().flatten() {
            match table.token(raw) {
                Some(token) if !sizes.contains(&token) => sizes.push(token),
                Some(_) => {}
                None => tracing::warn!(size = %raw, "dropping size not in the size table"),
            }
        }
        sizes.sort_by_key(|s| table.ordinal_or_last(s));

        let vocabulary = self.lexicon.vocabulary();
        let mut builder = RuleSetBuilder::new().sizes(sizes);
        let mut seen_colors: Vec<String> = Vec::new();
        for raw in payload.colors.iter().flatten() {
            let color = raw.trim();
            if color.is_empty() || vocabulary.is_placeholder_color(color) {
                continue;
            }
            let key = self
                .lexicon
                .colors
                .entry_of(color)
                .map_or_else(|| fold(color), |i| format!("#{i}"));
            if !seen_colors.contains(&key) {
                seen_colors.push(key);
                builder = builder.color(color);
            }
        }

        if let Some(price) = payload.base_price {
            builder = builder.base_price(price);
        }
        for rule in payload.price_rules.into_iter().flatten() {
            match rule.adjustment() {
                Some(adjustment) => {
                    builder = builder.price_rule(rule.condition.unwrap_or_default(), adjustment);
                }
                None => tracing::warn!(?rule, "dropping price rule without exactly one amount"),
            }
        }
        if let Some(price) = payload.compare_at_price {
            builder = builder.compare_at_price(price);
        }
        for rule in payload.compare_at_price_rules.into_iter().flatten() {
            if let Some(value) = rule.value {
                builder = builder.compare_rule(rule.condition.unwrap_or_default(), value);
            }
        }
        if let Some(stock) = payload.default_stock.and_then(quantity) {
            builder = builder.default_stock(stock);
        }
        for rule in payload.stock_rules.into_iter().flatten() {
            if let Some(stock) = rule.quantity.and_then(quantity) {
                builder = builder.stock_rule(rule.condition.unwrap_or_default(), stock);
            }
        }

        builder.build()
    }
}

#[async_trait]
impl<S: ExtractionService> PromptParser for AssistedParser<S> {
    async fn parse(&self, prompt: &str) -> Result<RuleSet, ParseFailure> {
        let request = ExtractionRequest::new(prompt);
        let raw = tokio::time::timeout(self.timeout, self.service.extract(&request))
            .await
            .map_err(|_| ParseFailure::Timeout {
                after: self.timeout,
            })??;
        let rule_set = self.decode(&raw)?;
        tracing::debug!(
            sizes = ?rule_set.sizes(),
            colors = ?rule_set.colors(),
            price_rules = rule_set.price_rules().len(),
            "assisted extraction"
        );
        Ok(rule_set)
    }
}

/// A primary parser backed by the deterministic scan. Never fails.
pub struct FallbackParser<P> {
    primary: P,
    fallback: DeterministicParser,
}

impl<P: PromptParser> FallbackParser<P> {
    pub fn new(primary: P, fallback: DeterministicParser) -> Self {
        Self { primary, fallback }
    }

    #[must_use]
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The primary parser's rule set, or the deterministic scan when it
    /// fails.
    pub async fn resolve(&self, prompt: &str) -> RuleSet {
        match self.primary.parse(prompt).await {
            Ok(rule_set) => rule_set,
            Err(err) => {
                tracing::warn!(error = %err, "assisted extraction failed, scanning prompt");
                self.fallback.scan(prompt)
            }
        }
    }
}

#[async_trait]
impl<P: PromptParser> PromptParser for FallbackParser<P> {
    async fn parse(&self, prompt: &str) -> Result<RuleSet, ParseFailure> {
        Ok(self.resolve(prompt).await)
    }
}
