use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rule::{Adjustment, CompareRule, PriceRule, StockRule};
use super::text::fold;

/// Builder for constructing a [`RuleSet`] by hand.
///
/// Sizes and colors are deduplicated as they are added (sizes ignoring case
/// and whitespace, colors ignoring case and diacritics); the first spelling
/// wins and insertion order is kept.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use varigen::{Adjustment, RuleSetBuilder};
///
/// let rule_set = RuleSetBuilder::new()
///     .sizes(["S", "M", "L", "XL"])
///     .colors(["Red", "Blue"])
///     .base_price(Decimal::from(200))
///     .price_rule("XL ve üzeri", Adjustment::IncreasePct(Decimal::from(10)))
///     .build();
/// assert_eq!(rule_set.sizes().len(), 4);
/// ```
#[derive(Debug, Default, Clone)]
pub struct RuleSetBuilder {
    inner: RuleSet,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn size(mut self, size: impl Into<String>) -> Self {
        let size = size.into();
        let key = size_key(&size);
        if !key.is_empty() && !self.inner.sizes.iter().any(|s| size_key(s) == key) {
            self.inner.sizes.push(size.trim().to_owned());
        }
        self
    }

    #[must_use]
    pub fn sizes<I, S>(self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        sizes.into_iter().fold(self, Self::size)
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        let key = fold(color.trim());
        if !key.is_empty() && !self.inner.colors.iter().any(|c| fold(c.trim()) == key) {
            self.inner.colors.push(color.trim().to_owned());
        }
        self
    }

    #[must_use]
    pub fn colors<I, S>(self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        colors.into_iter().fold(self, Self::color)
    }

    #[must_use]
    pub fn base_price(mut self, price: Decimal) -> Self {
        self.inner.base_price = Some(price);
        self
    }

    /// Append a price rule. Rules apply in the order they are added.
    #[must_use]
    pub fn price_rule(mut self, condition: impl Into<String>, adjustment: Adjustment) -> Self {
        self.inner
            .price_rules
            .push(PriceRule::new(condition, adjustment));
        self
    }

    #[must_use]
    pub fn compare_at_price(mut self, price: Decimal) -> Self {
        self.inner.compare_at_price = Some(price);
        self
    }

    #[must_use]
    pub fn compare_rule(mut self, condition: impl Into<String>, value: Decimal) -> Self {
        self.inner
            .compare_at_price_rules
            .push(CompareRule::new(condition, value));
        self
    }

    #[must_use]
    pub fn default_stock(mut self, quantity: u32) -> Self {
        self.inner.default_stock = Some(quantity);
        self
    }

    #[must_use]
    pub fn stock_rule(mut self, condition: impl Into<String>, quantity: u32) -> Self {
        self.inner
            .stock_rules
            .push(StockRule::new(condition, quantity));
        self
    }

    #[must_use]
    pub fn build(self) -> RuleSet {
        self.inner
    }
}

fn size_key(size: &str) -> String {
    size.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The canonical, declarative description of a variant matrix.
///
/// Created fresh per parse and never mutated afterwards; expanding the same
/// `RuleSet` always yields the same variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSet {
    pub(crate) sizes: Vec<String>,
    pub(crate) colors: Vec<String>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) base_price: Option<Decimal>,
    pub(crate) price_rules: Vec<PriceRule>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) compare_at_price: Option<Decimal>,
    pub(crate) compare_at_price_rules: Vec<CompareRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) default_stock: Option<u32>,
    pub(crate) stock_rules: Vec<StockRule>,
}

impl RuleSet {
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Sizes in ordinal order.
    #[must_use]
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Colors in the order the merchant named them.
    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    #[must_use]
    pub fn base_price(&self) -> Option<Decimal> {
        self.base_price
    }

    #[must_use]
    pub fn price_rules(&self) -> &[PriceRule] {
        &self.price_rules
    }

    #[must_use]
    pub fn compare_at_price(&self) -> Option<Decimal> {
        self.compare_at_price
    }

    #[must_use]
    pub fn compare_at_price_rules(&self) -> &[CompareRule] {
        &self.compare_at_price_rules
    }

    #[must_use]
    pub fn default_stock(&self) -> Option<u32> {
        self.default_stock
    }

    #[must_use]
    pub fn stock_rules(&self) -> &[StockRule] {
        &self.stock_rules
    }

    /// True when nothing at all was recognised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(feature = "fingerprint")]
impl RuleSet {
    /// BLAKE3 hash (hex) of the canonical JSON form.
    ///
    /// A commit path can compare this against the fingerprint recorded at
    /// preview time to make sure it expands the same rule set.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the rule set cannot be encoded.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let canonical = serde_json::to_vec(self)?;
        Ok(blake3::hash(&canonical).to_hex().to_string())
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} sizes, {} colors, {} price rules, {} compare rules, {} stock rules)",
            self.sizes.len(),
            self.colors.len(),
            self.price_rules.len(),
            self.compare_at_price_rules.len(),
            self.stock_rules.len(),
        )
    }
}
