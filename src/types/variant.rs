use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::size::SizeTable;
use super::text::fold;

/// Stable identifier of a generated variant.
///
/// Derived from the variant's (size, color) position in its rule set, so the
/// same rule set always yields the same ids.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `v-{size}-{color}` from zero-based positions.
    #[must_use]
    pub fn from_position(size_index: usize, color_index: usize) -> Self {
        Self(format!("v-{size_index}-{color_index}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for VariantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for VariantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Case-insensitive (size, color) identity of a variant.
///
/// Two variants with equal keys are duplicates. Also usable as an
/// idempotency key when committing variants to a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    size: String,
    color: String,
}

impl VariantKey {
    #[must_use]
    pub fn new(size: &str, color: &str) -> Self {
        Self {
            size: size
                .chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(char::to_uppercase)
                .collect(),
            color: fold(color.trim()),
        }
    }

    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.size, self.color)
    }
}

/// One sellable (size, color) combination with its final price and stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub size: String,
    pub color: String,
    /// Rounded to two decimal places by the builder.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub compare_at_price: Option<Decimal>,
    /// Signed so that an out-of-range override can be reported rather than
    /// wrapped; the builder never produces a negative value.
    pub stock: i64,
}

impl Variant {
    #[must_use]
    pub fn key(&self) -> VariantKey {
        VariantKey::new(&self.size, &self.color)
    }

    /// Like [`key()`](Self::key), with the size resolved through `sizes`
    /// aliases so `XXL` and `2XL` share a key.
    #[must_use]
    pub fn key_in(&self, sizes: &SizeTable) -> VariantKey {
        VariantKey::new(&sizes.normalize(&self.size), &self.color)
    }

    /// Human-readable label, e.g. `L / Red`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} / {}", self.size, self.color)
    }

    /// Whether a compare-at price above the price is set.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|c| c > self.price)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.id, self.label(), self.price)?;
        if let Some(compare) = self.compare_at_price {
            write!(f, " (was {compare})")?;
        }
        write!(f, ", stock {}", self.stock)
    }
}

/// An interactive edit to one variant, matched by id. `None` keeps the
/// generated value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOverride {
    pub id: VariantId,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub compare_at_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl VariantOverride {
    pub fn new(id: impl Into<VariantId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn compare_at_price(mut self, price: Decimal) -> Self {
        self.compare_at_price = Some(price);
        self
    }

    #[must_use]
    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub(crate) fn apply_to(&self, variant: &mut Variant) {
        if let Some(price) = self.price {
            variant.price = round_money(price);
        }
        if let Some(compare) = self.compare_at_price {
            variant.compare_at_price = Some(round_money(compare));
        }
        if let Some(stock) = self.stock {
            variant.stock = stock;
        }
    }
}

/// Two decimal places, halves away from zero.
pub(crate) fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
