use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;

use crate::config::{ConfigError, EngineConfig};
use crate::matcher::ConditionMatcher;
use crate::parse::{AssistedParser, DeterministicParser, ExtractionService, FallbackParser};
use crate::types::{
    ExpansionReport, Lexicon, RuleSet, ValidationErrors, Variant, VariantOverride,
};
use crate::validate::{check_dimensions, check_variants, validate};
use crate::VarigenError;

/// A parsed rule set together with the variants it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub rule_set: RuleSet,
    pub variants: Vec<Variant>,
}

/// The shared entry point for preview and commit.
///
/// Holds the immutable configuration and the condition matcher built from
/// it. `Engine` is `Send + Sync`; share one behind an `Arc`.
///
/// # Example
///
/// ```
/// use varigen::Engine;
///
/// let engine = Engine::default();
/// let rule_set = engine.parse("S to XL, red and blue, price 200, XL and above +%10");
/// let variants = engine.expand(&rule_set).unwrap();
/// assert_eq!(variants.len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    lexicon: Arc<Lexicon>,
    matcher: ConditionMatcher,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let lexicon = Arc::new(Lexicon::new(
            config.sizes.clone(),
            config.colors.clone(),
            &config.vocabulary,
        ));
        let matcher = ConditionMatcher::new(Arc::clone(&lexicon));
        Self {
            config,
            lexicon,
            matcher,
        }
    }

    /// Build an engine from a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is invalid.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        EngineConfig::from_toml_str(input).map(Self::new)
    }

    /// Read a TOML configuration file and build an engine from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        EngineConfig::from_file(path).map(Self::new)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    #[must_use]
    pub fn matcher(&self) -> &ConditionMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn deterministic_parser(&self) -> DeterministicParser {
        DeterministicParser::new(Arc::clone(&self.lexicon), self.config.parser.fallback)
    }

    /// Assisted extraction through `service`, recovered by the deterministic
    /// scan on any failure.
    pub fn assisted_parser<S: ExtractionService>(
        &self,
        service: S,
    ) -> FallbackParser<AssistedParser<S>> {
        let assisted = AssistedParser::new(
            service,
            Arc::clone(&self.lexicon),
            self.config.parser.assisted_timeout(),
        );
        FallbackParser::new(assisted, self.deterministic_parser())
    }

    /// Scan a prompt with the deterministic parser.
    #[must_use]
    pub fn parse(&self, prompt: &str) -> RuleSet {
        self.deterministic_parser().scan(prompt)
    }

    /// Expand a rule set without validating it.
    #[must_use]
    pub fn build(&self, rule_set: &RuleSet) -> Vec<Variant> {
        crate::expand::build(&self.matcher, &self.config.placeholders, rule_set, None).0
    }

    /// Like [`build()`](Self::build), with `price` standing in for an absent
    /// `basePrice`.
    #[must_use]
    pub fn build_with_fallback_price(&self, rule_set: &RuleSet, price: Decimal) -> Vec<Variant> {
        crate::expand::build(&self.matcher, &self.config.placeholders, rule_set, Some(price)).0
    }

    /// Expand with per-variant traces of the rules that fired.
    pub fn build_detailed(&self, rule_set: &RuleSet) -> ExpansionReport {
        let start = Instant::now();
        let (variants, traces) =
            crate::expand::build(&self.matcher, &self.config.placeholders, rule_set, None);
        ExpansionReport::new(variants, traces, start.elapsed())
    }

    /// Check a variant list against the configured limits and integrity
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns every problem found, aggregated.
    pub fn validate(&self, variants: &[Variant]) -> Result<(), ValidationErrors> {
        validate(variants, &self.config.limits, &self.lexicon.sizes)
    }

    /// Expand and validate. Preview and commit both call this.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] aggregating missing dimensions and every
    /// problem with the expanded list.
    pub fn expand(&self, rule_set: &RuleSet) -> Result<Vec<Variant>, ValidationErrors> {
        let mut problems = check_dimensions(rule_set, self.config.dimensions.policy);
        let variants = self.build(rule_set);
        problems.extend(check_variants(
            &variants,
            &self.config.limits,
            &self.lexicon.sizes,
        ));
        ValidationErrors::from_problems(problems)?;
        Ok(variants)
    }

    /// Scan a prompt, then [`expand()`](Self::expand) the result.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] if the expansion is rejected.
    pub fn expand_prompt(&self, prompt: &str) -> Result<Expansion, ValidationErrors> {
        let rule_set = self.parse(prompt);
        let variants = self.expand(&rule_set)?;
        Ok(Expansion { rule_set, variants })
    }

    /// Apply interactive edits by id, then validate the edited list.
    ///
    /// # Errors
    ///
    /// Returns [`VarigenError::UnknownVariant`] for an id not in the list,
    /// or [`VarigenError::Rejected`] if the edited list fails validation.
    pub fn apply_overrides(
        &self,
        mut variants: Vec<Variant>,
        overrides: &[VariantOverride],
    ) -> Result<Vec<Variant>, VarigenError> {
        for edit in overrides {
            let variant = variants
                .iter_mut()
                .find(|v| v.id == edit.id)
                .ok_or_else(|| VarigenError::UnknownVariant {
                    id: edit.id.clone(),
                })?;
            edit.apply_to(variant);
        }
        self.validate(&variants)?;
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DimensionPolicy;
    use crate::types::{Adjustment, Dimension, ProblemKind, RuleSetBuilder, ValidationProblem};

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn expand_reports_missing_dimensions() {
        let engine = Engine::default();
        let err = engine
            .expand(&RuleSetBuilder::new().sizes(["S"]).build())
            .unwrap_err();
        assert_eq!(
            err.problems(),
            [ValidationProblem::MissingRequiredDimension {
                dimension: Dimension::Color
            }]
        );
    }

    #[test]
    fn allow_none_uses_placeholders() {
        let mut config = EngineConfig::default();
        config.dimensions.policy = DimensionPolicy::AllowNone;
        let variants = Engine::new(config)
            .expand(&RuleSetBuilder::new().base_price(d(5)).build())
            .unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].label(), "One Size / Default");
    }

    #[test]
    fn dimension_and_limit_problems_aggregate() {
        let mut config = EngineConfig::default();
        config.limits.max_variants = 2;
        let err = Engine::new(config)
            .expand(&RuleSetBuilder::new().sizes(["S", "M", "L"]).build())
            .unwrap_err();
        assert!(err.has(ProblemKind::MissingRequiredDimension));
        assert!(err.has(ProblemKind::LimitExceeded));
    }

    #[test]
    fn preview_and_commit_agree() {
        let engine = Engine::default();
        let rule_set = RuleSetBuilder::new()
            .sizes(["S", "M"])
            .colors(["Red"])
            .base_price(d(100))
            .price_rule("M", Adjustment::IncreaseAbs(d(5)))
            .build();
        assert_eq!(engine.build(&rule_set), engine.expand(&rule_set).unwrap());
        assert_eq!(
            engine.build(&rule_set),
            engine.build_detailed(&rule_set).into_variants()
        );
    }

    #[test]
    fn fallback_price() {
        let engine = Engine::default();
        let rule_set = RuleSetBuilder::new().sizes(["S"]).colors(["Red"]).build();
        assert_eq!(engine.build(&rule_set)[0].price, Decimal::ZERO);
        assert_eq!(
            engine.build_with_fallback_price(&rule_set, d(40))[0].price,
            d(40)
        );
    }

    #[test]
    fn overrides_are_validated() {
        let engine = Engine::default();
        let rule_set = RuleSetBuilder::new()
            .sizes(["S", "M"])
            .colors(["Red"])
            .base_price(d(100))
            .build();
        let variants = engine.expand(&rule_set).unwrap();
        let id = variants[0].id.clone();

        let edited = engine
            .apply_overrides(
                variants.clone(),
                &[VariantOverride::new(id.clone()).price(d(80)).stock(3)],
            )
            .unwrap();
        assert_eq!(edited[0].price, d(80));
        assert_eq!(edited[0].stock, 3);

        let err = engine
            .apply_overrides(
                variants.clone(),
                &[VariantOverride::new(id).compare_at_price(d(50))],
            )
            .unwrap_err();
        assert!(matches!(err, VarigenError::Rejected(_)));

        let err = engine
            .apply_overrides(variants, &[VariantOverride::new("v-9-9").stock(1)])
            .unwrap_err();
        assert_eq!(err.to_string(), "no variant with id 'v-9-9'");
    }
}
