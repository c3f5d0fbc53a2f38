use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a price rule moves the running price. Exactly one kind per rule.
///
/// Serialized as `{"type": "increasePct", "amount": 10}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "camelCase")]
pub enum Adjustment {
    IncreaseAbs(#[serde(with = "rust_decimal::serde::float")] Decimal),
    DecreaseAbs(#[serde(with = "rust_decimal::serde::float")] Decimal),
    IncreasePct(#[serde(with = "rust_decimal::serde::float")] Decimal),
    DecreasePct(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

impl Adjustment {
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match *self {
            Adjustment::IncreaseAbs(a)
            | Adjustment::DecreaseAbs(a)
            | Adjustment::IncreasePct(a)
            | Adjustment::DecreasePct(a) => a,
        }
    }

    #[must_use]
    pub fn is_percentage(&self) -> bool {
        matches!(self, Adjustment::IncreasePct(_) | Adjustment::DecreasePct(_))
    }

    /// The same adjustment with a non-negative amount; a negative increase
    /// becomes a decrease and vice versa.
    #[must_use]
    pub fn normalized(self) -> Self {
        if !self.amount().is_sign_negative() {
            return self;
        }
        match self {
            Adjustment::IncreaseAbs(a) => Adjustment::DecreaseAbs(-a),
            Adjustment::DecreaseAbs(a) => Adjustment::IncreaseAbs(-a),
            Adjustment::IncreasePct(a) => Adjustment::DecreasePct(-a),
            Adjustment::DecreasePct(a) => Adjustment::IncreasePct(-a),
        }
    }

    /// Apply to a running price. Percentages act on `running`, so two `+10%`
    /// rules compound. Overflow saturates at `Decimal::MAX`.
    #[must_use]
    pub fn apply(&self, running: Decimal) -> Decimal {
        let result = match self.normalized() {
            Adjustment::IncreaseAbs(a) => running.checked_add(a),
            Adjustment::DecreaseAbs(a) => running.checked_sub(a),
            Adjustment::IncreasePct(p) => percent_of(running, Decimal::ONE_HUNDRED + p),
            Adjustment::DecreasePct(p) => percent_of(running, Decimal::ONE_HUNDRED - p),
        };
        result.unwrap_or(Decimal::MAX)
    }
}

fn percent_of(value: Decimal, percent: Decimal) -> Option<Decimal> {
    value
        .checked_mul(percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::IncreaseAbs(a) => write!(f, "+{a}"),
            Adjustment::DecreaseAbs(a) => write!(f, "-{a}"),
            Adjustment::IncreasePct(p) => write!(f, "+{p}%"),
            Adjustment::DecreasePct(p) => write!(f, "-{p}%"),
        }
    }
}

/// Adjust the price of every variant the condition matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRule {
    pub condition: String,
    pub adjustment: Adjustment,
}

impl PriceRule {
    pub fn new(condition: impl Into<String>, adjustment: Adjustment) -> Self {
        Self {
            condition: condition.into(),
            adjustment: adjustment.normalized(),
        }
    }
}

/// Set the stock of matching variants. A universal condition sets the
/// general default instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockRule {
    pub condition: String,
    pub quantity: u32,
}

impl StockRule {
    pub fn new(condition: impl Into<String>, quantity: u32) -> Self {
        Self {
            condition: condition.into(),
            quantity,
        }
    }
}

/// Set the compare-at price of matching variants. The last match wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompareRule {
    pub condition: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl CompareRule {
    pub fn new(condition: impl Into<String>, value: Decimal) -> Self {
        Self {
            condition: condition.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn absolute_adjustments() {
        assert_eq!(Adjustment::IncreaseAbs(d(20)).apply(d(100)), d(120));
        assert_eq!(Adjustment::DecreaseAbs(d(20)).apply(d(100)), d(80));
    }

    #[test]
    fn percentage_compounds_on_running_price() {
        let ten = Adjustment::IncreasePct(d(10));
        let once = ten.apply(d(100));
        let twice = ten.apply(once);
        assert_eq!(twice, d(121));
    }

    #[test]
    fn percentage_decrease() {
        assert_eq!(Adjustment::DecreasePct(d(25)).apply(d(200)), d(150));
    }

    #[test]
    fn negative_amounts_flip_direction() {
        assert_eq!(
            Adjustment::IncreaseAbs(d(-5)).normalized(),
            Adjustment::DecreaseAbs(d(5))
        );
        let rule = PriceRule::new("XL", Adjustment::DecreasePct(d(-10)));
        assert_eq!(rule.adjustment, Adjustment::IncreasePct(d(10)));
    }

    #[test]
    fn overflow_saturates() {
        assert_eq!(
            Adjustment::IncreaseAbs(Decimal::MAX).apply(Decimal::MAX),
            Decimal::MAX
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(Adjustment::IncreasePct(d(10)).to_string(), "+10%");
        assert_eq!(Adjustment::DecreaseAbs(d(5)).to_string(), "-5");
    }

    #[test]
    fn price_rule_json_shape() {
        let rule = PriceRule::new("XL ve üzeri", Adjustment::IncreasePct(d(10)));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["condition"], "XL ve üzeri");
        assert_eq!(json["adjustment"]["type"], "increasePct");
        assert_eq!(json["adjustment"]["amount"], 10.0);

        let back: PriceRule = serde_json::from_str(
            r#"{"condition":"kırmızı","adjustment":{"type":"increaseAbs","amount":20}}"#,
        )
        .unwrap();
        assert_eq!(back.adjustment, Adjustment::IncreaseAbs(d(20)));
    }
}
