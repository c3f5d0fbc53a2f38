use std::collections::HashMap;

use crate::config::{DimensionPolicy, Limits};
use crate::types::{
    Dimension, RuleSet, SizeTable, ValidationErrors, ValidationProblem, Variant, VariantKey,
};

/// Problems with the axes a rule set names, under the given policy.
pub(crate) fn check_dimensions(
    rule_set: &RuleSet,
    policy: DimensionPolicy,
) -> Vec<ValidationProblem> {
    let no_sizes = rule_set.sizes.is_empty();
    let no_colors = rule_set.colors.is_empty();
    let missing = |dimension| ValidationProblem::MissingRequiredDimension { dimension };
    match policy {
        DimensionPolicy::RequireBoth => {
            let mut problems = Vec::new();
            if no_sizes {
                problems.push(missing(Dimension::Size));
            }
            if no_colors {
                problems.push(missing(Dimension::Color));
            }
            problems
        }
        DimensionPolicy::RequireAny if no_sizes && no_colors => {
            vec![missing(Dimension::Size), missing(Dimension::Color)]
        }
        DimensionPolicy::RequireAny | DimensionPolicy::AllowNone => Vec::new(),
    }
}

/// Structural and numeric checks over a variant list. Every problem is
/// collected; nothing is truncated, clamped or merged. Duplicate keys resolve
/// size aliases through `sizes`.
pub(crate) fn check_variants(
    variants: &[Variant],
    limits: &Limits,
    sizes: &SizeTable,
) -> Vec<ValidationProblem> {
    let mut problems = Vec::new();

    if variants.len() > limits.max_variants {
        problems.push(ValidationProblem::TooManyVariants {
            actual: variants.len(),
            cap: limits.max_variants,
        });
    }

    let options = option_count(variants);
    if options > limits.max_options {
        problems.push(ValidationProblem::TooManyOptions {
            actual: options,
            cap: limits.max_options,
        });
    }

    let mut seen: HashMap<VariantKey, String> = HashMap::with_capacity(variants.len());
    for variant in variants {
        let label = variant.label();
        let key = variant.key_in(sizes);
        if let Some(first) = seen.get(&key) {
            problems.push(ValidationProblem::DuplicateVariant {
                first: first.clone(),
                duplicate: label.clone(),
            });
        } else {
            seen.insert(key, label.clone());
        }

        if variant.price.is_sign_negative() || variant.price > limits.max_price {
            problems.push(ValidationProblem::PriceOutOfBounds {
                variant: label.clone(),
                price: variant.price,
                max: limits.max_price,
            });
        }
        if variant.stock < 0 || variant.stock > limits.max_stock {
            problems.push(ValidationProblem::StockOutOfBounds {
                variant: label.clone(),
                stock: variant.stock,
                max: limits.max_stock,
            });
        }
        if let Some(compare_at_price) = variant.compare_at_price {
            if compare_at_price <= variant.price {
                problems.push(ValidationProblem::InvalidCompareAtPrice {
                    variant: label,
                    price: variant.price,
                    compare_at_price,
                });
            }
        }
    }

    problems
}

/// Size and color are one axis each; an axis counts once any variant uses it.
fn option_count(variants: &[Variant]) -> usize {
    let sizes = variants.iter().any(|v| !v.size.trim().is_empty());
    let colors = variants.iter().any(|v| !v.color.trim().is_empty());
    usize::from(sizes) + usize::from(colors)
}

pub(crate) fn validate(
    variants: &[Variant],
    limits: &Limits,
    sizes: &SizeTable,
) -> Result<(), ValidationErrors> {
    ValidationErrors::from_problems(check_variants(variants, limits, sizes))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{ProblemKind, RuleSetBuilder, VariantId};

    fn check(variants: &[Variant], limits: &Limits) -> Result<(), ValidationErrors> {
        validate(variants, limits, &SizeTable::standard())
    }

    fn variant(size: &str, color: &str, price: i64) -> Variant {
        Variant {
            id: VariantId::new(format!("{size}-{color}")),
            size: size.into(),
            color: color.into(),
            price: Decimal::from(price),
            compare_at_price: None,
            stock: 1,
        }
    }

    #[test]
    fn valid_list_passes() {
        let variants = vec![variant("S", "Red", 10), variant("M", "Red", 10)];
        assert!(check(&variants, &Limits::default()).is_ok());
    }

    #[test]
    fn too_many_variants_names_count_and_cap() {
        let limits = Limits {
            max_variants: 1,
            ..Limits::default()
        };
        let variants = vec![variant("S", "Red", 10), variant("M", "Red", 10)];
        let err = check(&variants, &limits).unwrap_err();
        assert_eq!(
            err.problems(),
            [ValidationProblem::TooManyVariants { actual: 2, cap: 1 }]
        );
    }

    #[test]
    fn option_cap() {
        let limits = Limits {
            max_options: 1,
            ..Limits::default()
        };
        let err = check(&[variant("S", "Red", 10)], &limits).unwrap_err();
        assert!(err.to_string().contains("option count 2 exceeds the limit of 1"));
    }

    #[test]
    fn duplicates_are_case_insensitive() {
        let variants = vec![variant("L", "Red", 10), variant("l", "red", 10)];
        let err = check(&variants, &Limits::default()).unwrap_err();
        assert_eq!(
            err.problems(),
            [ValidationProblem::DuplicateVariant {
                first: "L / Red".into(),
                duplicate: "l / red".into(),
            }]
        );
    }

    #[test]
    fn duplicates_resolve_size_aliases() {
        let variants = vec![variant("XXL", "Red", 10), variant("2XL", "red", 10)];
        let err = check(&variants, &Limits::default()).unwrap_err();
        assert_eq!(
            err.problems(),
            [ValidationProblem::DuplicateVariant {
                first: "XXL / Red".into(),
                duplicate: "2XL / red".into(),
            }]
        );
    }

    #[test]
    fn out_of_bounds_values_are_rejected_not_clamped() {
        let mut cheap = variant("S", "Red", -1);
        cheap.stock = -3;
        let pricey = variant("M", "Red", 2_000_000);
        let err = check(&[cheap, pricey], &Limits::default()).unwrap_err();
        assert_eq!(err.len(), 3);
        assert!(err.has(ProblemKind::LimitExceeded));
    }

    #[test]
    fn compare_at_must_exceed_price() {
        let mut equal = variant("S", "Red", 50);
        equal.compare_at_price = Some(Decimal::from(50));
        let err = check(&[equal], &Limits::default()).unwrap_err();
        assert!(err.has(ProblemKind::InvalidCompareAtPrice));
        assert!(err.to_string().contains("compare-at price 50 must be greater than price 50"));

        let mut higher = variant("S", "Red", 50);
        higher.compare_at_price = Some(Decimal::from(60));
        assert!(check(&[higher], &Limits::default()).is_ok());
    }

    #[test]
    fn every_problem_is_reported() {
        let mut a = variant("S", "Red", 50);
        a.compare_at_price = Some(Decimal::from(10));
        let b = variant("s", "RED", 50);
        let err = check(&[a, b], &Limits::default()).unwrap_err();
        assert!(err.has(ProblemKind::InvalidCompareAtPrice));
        assert!(err.has(ProblemKind::DuplicateVariant));
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn dimension_policies() {
        let empty = RuleSetBuilder::new().build();
        let sizes_only = RuleSetBuilder::new().sizes(["S"]).build();

        assert_eq!(check_dimensions(&empty, DimensionPolicy::RequireBoth).len(), 2);
        assert_eq!(
            check_dimensions(&sizes_only, DimensionPolicy::RequireBoth),
            [ValidationProblem::MissingRequiredDimension {
                dimension: Dimension::Color
            }]
        );
        assert!(check_dimensions(&sizes_only, DimensionPolicy::RequireAny).is_empty());
        assert_eq!(check_dimensions(&empty, DimensionPolicy::RequireAny).len(), 2);
        assert!(check_dimensions(&empty, DimensionPolicy::AllowNone).is_empty());
    }
}
