use rust_decimal::Decimal;
use varigen::{
    Engine, EngineConfig, ProblemKind, RuleSetBuilder, ValidationProblem, Variant, VariantId,
    VariantOverride,
};

const TWELVE_COLORS: [&str; 12] = [
    "Red", "Green", "Blue", "Yellow", "Purple", "Black", "White", "Gray", "Orange", "Pink",
    "Navy", "Brown",
];

fn d(n: i64) -> Decimal {
    Decimal::from(n)
}

fn variant(id: &str, size: &str, color: &str, price: i64) -> Variant {
    Variant {
        id: VariantId::new(id),
        size: size.into(),
        color: color.into(),
        price: d(price),
        compare_at_price: None,
        stock: 0,
    }
}

#[test]
fn full_matrix_over_the_cap_is_rejected_not_truncated() {
    let engine = Engine::default();
    let rule_set = RuleSetBuilder::new()
        .sizes(["XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL"])
        .colors(TWELVE_COLORS)
        .base_price(d(100))
        .build();

    assert_eq!(engine.build(&rule_set).len(), 108);
    let err = engine.expand(&rule_set).unwrap_err();
    assert_eq!(
        err.problems(),
        [ValidationProblem::TooManyVariants {
            actual: 108,
            cap: 100
        }]
    );
    let message = err.to_string();
    assert!(message.contains("108"));
    assert!(message.contains("100"));
}

#[test]
fn exactly_at_the_cap_is_accepted() {
    let engine = Engine::default();
    let rule_set = RuleSetBuilder::new()
        .sizes(["XS", "S", "M", "L", "XL"])
        .colors(["Red", "Green", "Blue", "Yellow"])
        .build();
    let mut config = EngineConfig::default();
    config.limits.max_variants = 20;
    assert_eq!(Engine::new(config).expand(&rule_set).unwrap().len(), 20);
    assert!(engine.expand(&rule_set).is_ok());
}

#[test]
fn compare_at_price_must_exceed_price() {
    let engine = Engine::default();
    let base = RuleSetBuilder::new().sizes(["M"]).colors(["Red"]).base_price(d(50));

    let err = engine
        .expand(&base.clone().compare_at_price(d(50)).build())
        .unwrap_err();
    assert!(err.has(ProblemKind::InvalidCompareAtPrice));
    assert!(err.to_string().contains("compare-at price 50 must be greater than price 50"));

    let variants = engine
        .expand(&base.compare_at_price(d(60)).build())
        .unwrap();
    assert_eq!(variants[0].compare_at_price, Some(d(60)));
    assert!(variants[0].is_on_sale());
}

#[test]
fn duplicate_keys_ignore_case() {
    let engine = Engine::default();
    let err = engine
        .validate(&[variant("a", "L", "Red", 10), variant("b", "l", "red", 10)])
        .unwrap_err();
    assert_eq!(
        err.problems(),
        [ValidationProblem::DuplicateVariant {
            first: "L / Red".into(),
            duplicate: "l / red".into(),
        }]
    );
}

#[test]
fn duplicate_keys_resolve_size_aliases() {
    let engine = Engine::default();
    let err = engine
        .validate(&[variant("a", "XXL", "Red", 10), variant("b", "2XL", "Red", 10)])
        .unwrap_err();
    assert!(err.has(ProblemKind::DuplicateVariant));
    assert_eq!(err.len(), 1);
}

#[test]
fn configured_ceilings_apply() {
    let mut config = EngineConfig::default();
    config.limits.max_price = d(500);
    config.limits.max_stock = 50;
    let engine = Engine::new(config);
    let rule_set = RuleSetBuilder::new()
        .sizes(["S"])
        .colors(["Red"])
        .base_price(d(600))
        .default_stock(60)
        .build();

    let err = engine.expand(&rule_set).unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err
        .problems()
        .iter()
        .all(|p| p.kind() == ProblemKind::LimitExceeded));
}

#[test]
fn all_problems_reported_together() {
    let engine = Engine::default();
    let mut over = variant("a", "S", "Red", 10);
    over.compare_at_price = Some(d(5));
    let mut negative = variant("b", "M", "Red", 10);
    negative.stock = -1;
    let duplicate = variant("c", "s", "RED", 10);

    let err = engine.validate(&[over, negative, duplicate]).unwrap_err();
    assert_eq!(err.len(), 3);
    assert!(err.to_string().starts_with("3 validation problems:"));
}

#[test]
fn overrides_feed_the_validator() {
    let engine = Engine::default();
    let rule_set = RuleSetBuilder::new()
        .sizes(["S", "M"])
        .colors(["Red"])
        .base_price(d(100))
        .default_stock(5)
        .build();
    let variants = engine.expand(&rule_set).unwrap();
    let s = variants[0].id.clone();
    let m = variants[1].id.clone();

    let edited = engine
        .apply_overrides(
            variants.clone(),
            &[
                VariantOverride::new(s.clone()).price(Decimal::new(89_995, 3)),
                VariantOverride::new(m).compare_at_price(d(150)),
            ],
        )
        .unwrap();
    assert_eq!(edited[0].price, Decimal::new(9000, 2));
    assert_eq!(edited[1].compare_at_price, Some(d(150)));

    let err = engine
        .apply_overrides(variants, &[VariantOverride::new(s).stock(-2)])
        .unwrap_err();
    assert!(err.to_string().contains("stock -2"));
}
