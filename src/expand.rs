use rust_decimal::Decimal;

use crate::config::Placeholders;
use crate::matcher::{AnalyzedCondition, ConditionMatcher, Target};
use crate::types::{round_money, RuleSet, StockSource, Variant, VariantId, VariantTrace};

/// Rule conditions analyzed once per expansion.
struct CompiledConditions {
    price: Vec<AnalyzedCondition>,
    compare: Vec<AnalyzedCondition>,
    /// `(rule index, condition, applies to every variant)`.
    stock: Vec<(usize, AnalyzedCondition, bool)>,
}

impl CompiledConditions {
    fn new(matcher: &ConditionMatcher, rule_set: &RuleSet) -> Self {
        let price = rule_set
            .price_rules
            .iter()
            .map(|r| matcher.analyze(&r.condition))
            .collect();
        let compare = rule_set
            .compare_at_price_rules
            .iter()
            .map(|r| matcher.analyze(&r.condition))
            .collect();
        let stock = rule_set
            .stock_rules
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let condition = matcher.analyze(&r.condition);
                let general = matcher.is_universal(&condition);
                (i, condition, general)
            })
            .collect();
        Self {
            price,
            compare,
            stock,
        }
    }
}

/// Expand a rule set into its ordered variant list, with one trace per variant.
pub(crate) fn build(
    matcher: &ConditionMatcher,
    placeholders: &Placeholders,
    rule_set: &RuleSet,
    fallback_price: Option<Decimal>,
) -> (Vec<Variant>, Vec<VariantTrace>) {
    let table = &matcher.lexicon().sizes;
    let sizes: Vec<String> = if rule_set.sizes.is_empty() {
        vec![placeholders.size.clone()]
    } else {
        rule_set
            .sizes
            .iter()
            .map(|s| table.token(s).map_or_else(|| s.trim().to_owned(), str::to_owned))
            .collect()
    };
    let colors: Vec<String> = if rule_set.colors.is_empty() {
        vec![placeholders.color.clone()]
    } else {
        rule_set.colors.iter().map(|c| c.trim().to_owned()).collect()
    };

    let positions: Vec<(usize, usize)> = if rule_set.colors.is_empty() {
        (0..sizes.len())
            .flat_map(|s| (0..colors.len()).map(move |c| (s, c)))
            .collect()
    } else {
        (0..colors.len())
            .flat_map(|c| (0..sizes.len()).map(move |s| (s, c)))
            .collect()
    };

    let conditions = CompiledConditions::new(matcher, rule_set);
    let base = rule_set
        .base_price
        .or(fallback_price)
        .unwrap_or(Decimal::ZERO);
    let general = general_stock(rule_set, &conditions);

    let mut rows: Vec<((usize, usize, usize), Variant, VariantTrace)> = positions
        .into_iter()
        .map(|(s, c)| {
            let size = sizes[s].as_str();
            let color = colors[c].as_str();
            let target = Target::new(Some(size), Some(color));
            let (variant, trace) =
                build_one(matcher, rule_set, &conditions, base, general, (s, c), target);
            ((c, table.ordinal_or_last(size), s), variant, trace)
        })
        .collect();
    rows.sort_by_key(|(key, _, _)| *key);

    tracing::debug!(
        variants = rows.len(),
        sizes = sizes.len(),
        colors = colors.len(),
        price_rules = rule_set.price_rules.len(),
        "expanded rule set"
    );

    rows.into_iter().map(|(_, v, t)| (v, t)).unzip()
}

fn general_stock(rule_set: &RuleSet, conditions: &CompiledConditions) -> (u32, StockSource) {
    let start = (rule_set.default_stock.unwrap_or(0), StockSource::Default);
    conditions
        .stock
        .iter()
        .filter(|(_, _, general)| *general)
        .fold(start, |_, (i, _, _)| {
            (rule_set.stock_rules[*i].quantity, StockSource::General(*i))
        })
}

fn build_one(
    matcher: &ConditionMatcher,
    rule_set: &RuleSet,
    conditions: &CompiledConditions,
    base: Decimal,
    general: (u32, StockSource),
    (s, c): (usize, usize),
    target: Target<'_>,
) -> (Variant, VariantTrace) {
    let mut price = base;
    let mut fired = Vec::new();
    for (i, condition) in conditions.price.iter().enumerate() {
        if matcher.matches_analyzed(condition, target) {
            price = rule_set.price_rules[i].adjustment.apply(price);
            fired.push(i);
        }
    }
    let price = round_money(price.max(Decimal::ZERO));

    let (compare_at_price, compare_rule) = if conditions.compare.is_empty() {
        (rule_set.compare_at_price, None)
    } else {
        let winner = conditions
            .compare
            .iter()
            .rposition(|condition| matcher.matches_analyzed(condition, target));
        (
            winner.map(|i| rule_set.compare_at_price_rules[i].value),
            winner,
        )
    };

    let specific = conditions
        .stock
        .iter()
        .rev()
        .find(|(_, condition, general)| !general && matcher.matches_analyzed(condition, target))
        .map(|(i, _, _)| (rule_set.stock_rules[*i].quantity, StockSource::Specific(*i)));
    let (stock, stock_source) = specific.unwrap_or(general);

    let id = VariantId::from_position(s, c);
    let variant = Variant {
        id: id.clone(),
        size: target.size.unwrap_or_default().to_owned(),
        color: target.color.unwrap_or_default().to_owned(),
        price,
        compare_at_price: compare_at_price.map(round_money),
        stock: i64::from(stock),
    };
    let trace = VariantTrace {
        id,
        price_rules: fired,
        compare_rule,
        stock: stock_source,
    };
    (variant, trace)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{Adjustment, Lexicon, RuleSetBuilder};

    fn expand(rule_set: &RuleSet) -> Vec<Variant> {
        let matcher = ConditionMatcher::new(Arc::new(Lexicon::default()));
        build(&matcher, &Placeholders::default(), rule_set, None).0
    }

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn find<'a>(variants: &'a [Variant], size: &str, color: &str) -> &'a Variant {
        variants
            .iter()
            .find(|v| v.size == size && v.color == color)
            .unwrap()
    }

    #[test]
    fn placeholders_fill_missing_axes() {
        let variants = expand(&RuleSetBuilder::new().build());
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].size, "One Size");
        assert_eq!(variants[0].color, "Default");
        assert_eq!(variants[0].price, Decimal::ZERO);
        assert_eq!(variants[0].stock, 0);
    }

    #[test]
    fn color_major_order_with_declared_colors() {
        let variants = expand(
            &RuleSetBuilder::new()
                .sizes(["M", "S"])
                .colors(["Mavi", "Kırmızı"])
                .build(),
        );
        let labels: Vec<String> = variants.iter().map(Variant::label).collect();
        assert_eq!(
            labels,
            ["S / Mavi", "M / Mavi", "S / Kırmızı", "M / Kırmızı"]
        );
    }

    #[test]
    fn ids_follow_declared_positions() {
        let variants = expand(
            &RuleSetBuilder::new()
                .sizes(["S", "M"])
                .colors(["Red", "Blue"])
                .build(),
        );
        assert_eq!(find(&variants, "M", "Blue").id.as_str(), "v-1-1");
        assert_eq!(find(&variants, "S", "Blue").id.as_str(), "v-0-1");
    }

    #[test]
    fn sizes_are_canonicalised() {
        let variants = expand(&RuleSetBuilder::new().sizes(["xxl", "s"]).build());
        let sizes: Vec<&str> = variants.iter().map(|v| v.size.as_str()).collect();
        assert_eq!(sizes, ["S", "2XL"]);
    }

    #[test]
    fn price_rules_apply_in_order() {
        let rule_set = RuleSetBuilder::new()
            .sizes(["M"])
            .base_price(d(100))
            .price_rule("all", Adjustment::IncreaseAbs(d(10)))
            .price_rule("all", Adjustment::IncreasePct(d(10)))
            .build();
        assert_eq!(expand(&rule_set)[0].price, Decimal::new(12100, 2));
    }

    #[test]
    fn price_clamped_at_zero() {
        let rule_set = RuleSetBuilder::new()
            .base_price(d(10))
            .price_rule("all", Adjustment::DecreaseAbs(d(25)))
            .build();
        assert_eq!(expand(&rule_set)[0].price, Decimal::ZERO);
    }

    #[test]
    fn price_rounds_half_away_from_zero() {
        let rule_set = RuleSetBuilder::new()
            .base_price(Decimal::new(1005, 2))
            .price_rule("all", Adjustment::IncreasePct(d(50)))
            .build();
        // 10.05 * 1.5 = 15.075
        assert_eq!(expand(&rule_set)[0].price, Decimal::new(1508, 2));
    }

    #[test]
    fn compare_rules_override_flat_value() {
        let rule_set = RuleSetBuilder::new()
            .sizes(["S", "XL"])
            .base_price(d(100))
            .compare_at_price(d(500))
            .compare_rule("XL", d(150))
            .build();
        let variants = expand(&rule_set);
        assert_eq!(find(&variants, "XL", "Default").compare_at_price, Some(d(150)));
        assert_eq!(find(&variants, "S", "Default").compare_at_price, None);
    }

    #[test]
    fn flat_compare_used_without_rules() {
        let rule_set = RuleSetBuilder::new()
            .base_price(d(100))
            .compare_at_price(d(120))
            .build();
        assert_eq!(expand(&rule_set)[0].compare_at_price, Some(d(120)));
    }

    #[test]
    fn last_matching_compare_rule_wins() {
        let rule_set = RuleSetBuilder::new()
            .sizes(["L"])
            .compare_rule("all", d(150))
            .compare_rule("L", d(170))
            .build();
        assert_eq!(expand(&rule_set)[0].compare_at_price, Some(d(170)));
    }

    #[test]
    fn specific_stock_beats_general_in_any_order() {
        let rule_set = RuleSetBuilder::new()
            .sizes(["L", "2XL"])
            .stock_rule("2XL", 5)
            .stock_rule("all", 10)
            .build();
        let variants = expand(&rule_set);
        assert_eq!(find(&variants, "2XL", "Default").stock, 5);
        assert_eq!(find(&variants, "L", "Default").stock, 10);
    }

    #[test]
    fn default_stock_applies_without_rules() {
        let rule_set = RuleSetBuilder::new().sizes(["S"]).default_stock(7).build();
        assert_eq!(expand(&rule_set)[0].stock, 7);
    }

    #[test]
    fn traces_record_sources() {
        let matcher = ConditionMatcher::new(Arc::new(Lexicon::default()));
        let rule_set = RuleSetBuilder::new()
            .sizes(["L", "XL"])
            .base_price(d(100))
            .price_rule("XL", Adjustment::IncreaseAbs(d(5)))
            .stock_rule("all", 3)
            .stock_rule("XL", 1)
            .build();
        let (variants, traces) = build(&matcher, &Placeholders::default(), &rule_set, None);
        assert_eq!(variants.len(), traces.len());
        let xl = variants.iter().position(|v| v.size == "XL").unwrap();
        assert_eq!(traces[xl].price_rules, vec![0]);
        assert_eq!(traces[xl].stock, StockSource::Specific(1));
        let l = variants.iter().position(|v| v.size == "L").unwrap();
        assert!(traces[l].price_rules.is_empty());
        assert_eq!(traces[l].stock, StockSource::General(0));
    }

    #[test]
    fn fallback_price_used_when_base_absent() {
        let matcher = ConditionMatcher::new(Arc::new(Lexicon::default()));
        let rule_set = RuleSetBuilder::new().build();
        let (variants, _) = build(&matcher, &Placeholders::default(), &rule_set, Some(d(99)));
        assert_eq!(variants[0].price, d(99));
    }
}
