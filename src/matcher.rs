//! Decides whether a free-text rule condition applies to a (size, color) pair.
//!
//! The matcher is an ordered list of [`ConditionStrategy`] objects. Each one
//! either declines (`None`) or decides (`Some(bool)`); the first decision wins
//! and a condition nobody decides does not match.

use std::fmt;
use std::sync::Arc;

use crate::types::text::contains_phrase;
use crate::types::{words, Lexicon};

/// A condition pre-processed once so it can be tested against many variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedCondition {
    raw: String,
    words: Vec<String>,
    size_like: bool,
    colors: Vec<usize>,
}

impl AnalyzedCondition {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Folded words of the condition.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whether any word is a size token, looks like one (`7xl`), or is a
    /// size word such as "beden".
    #[must_use]
    pub fn has_size_like(&self) -> bool {
        self.size_like
    }

    /// Color table entries the condition names.
    #[must_use]
    pub fn colors(&self) -> &[usize] {
        &self.colors
    }
}

/// The variant a condition is tested against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target<'a> {
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

impl<'a> Target<'a> {
    #[must_use]
    pub fn new(size: Option<&'a str>, color: Option<&'a str>) -> Self {
        Self { size, color }
    }
}

/// One branch of condition resolution.
pub trait ConditionStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the strategy does not apply to this condition.
    fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool>;
}

/// "all", "tümü", "*", or an empty condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Universal;

impl ConditionStrategy for Universal {
    fn name(&self) -> &'static str {
        "universal"
    }

    fn decide(
        &self,
        condition: &AnalyzedCondition,
        _target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool> {
        lexicon
            .vocabulary()
            .is_universal(&condition.words)
            .then_some(true)
    }
}

/// Conditions that name a color and no size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMatch;

impl ConditionStrategy for ColorMatch {
    fn name(&self) -> &'static str {
        "color"
    }

    fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool> {
        if condition.size_like {
            return None;
        }
        let color = target.color?;
        if contains_phrase(&condition.words[..], &words(color)[..]) {
            return Some(true);
        }
        if condition.colors.is_empty() {
            return None;
        }
        let entry = lexicon.colors.entry_of(color);
        Some(entry.is_some_and(|e| condition.colors.contains(&e)))
    }
}

/// The whole condition is one size token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSize;

impl ConditionStrategy for ExactSize {
    fn name(&self) -> &'static str {
        "exact-size"
    }

    fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool> {
        let index = lexicon.sizes.index_of(&condition.words.concat())?;
        let size = target.size?;
        Some(lexicon.sizes.index_of(size) == Some(index))
    }
}

/// "2XL ve üzeri", "XL'den büyük", "L and above".
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRange;

impl ConditionStrategy for OpenRange {
    fn name(&self) -> &'static str {
        "open-range"
    }

    fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool> {
        lexicon.vocabulary().open_range_in(&condition.words)?;
        let size = target.size?;
        let table = &lexicon.sizes;
        if let Some(bound) = condition.words.iter().find_map(|w| table.index_of(w)) {
            return Some(table.index_of(size).is_some_and(|i| i >= bound));
        }
        // No known token, but an XL-family word such as "7xl": match the family.
        if condition.words.iter().any(|w| w.ends_with("xl")) {
            return Some(table.normalize(size).ends_with("XL"));
        }
        None
    }
}

/// A size token appearing as a whole word anywhere in the condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedToken;

impl ConditionStrategy for EmbeddedToken {
    fn name(&self) -> &'static str {
        "embedded-token"
    }

    fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
        lexicon: &Lexicon,
    ) -> Option<bool> {
        let table = &lexicon.sizes;
        let found: Vec<&str> = table
            .scan_longest_first()
            .filter(|token| {
                condition
                    .words
                    .iter()
                    .any(|w| table.token(w) == Some(*token))
            })
            .collect();
        if found.is_empty() {
            return None;
        }
        let size = target.size?;
        let size = table.normalize(size);
        Some(found.iter().any(|t| *t == size))
    }
}

/// The standard resolution order.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn ConditionStrategy>> {
    vec![
        Box::new(Universal),
        Box::new(ColorMatch),
        Box::new(ExactSize),
        Box::new(OpenRange),
        Box::new(EmbeddedToken),
    ]
}

/// Ordered strategy list bound to a lexicon.
#[derive(Debug, Clone)]
pub struct ConditionMatcher {
    lexicon: Arc<Lexicon>,
    strategies: Arc<[Box<dyn ConditionStrategy>]>,
}

impl ConditionMatcher {
    #[must_use]
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::with_strategies(lexicon, default_strategies())
    }

    #[must_use]
    pub fn with_strategies(
        lexicon: Arc<Lexicon>,
        strategies: Vec<Box<dyn ConditionStrategy>>,
    ) -> Self {
        Self {
            lexicon,
            strategies: strategies.into(),
        }
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    #[must_use]
    pub fn analyze(&self, condition: &str) -> AnalyzedCondition {
        let condition_words = words(condition);
        let vocabulary = self.lexicon.vocabulary();
        let size_like = condition_words
            .iter()
            .any(|w| self.lexicon.sizes.is_size_like(w) || vocabulary.size_words.contains(w));
        let colors = self.lexicon.colors.named_in(&condition_words);
        AnalyzedCondition {
            raw: condition.to_owned(),
            words: condition_words,
            size_like,
            colors,
        }
    }

    /// The deciding strategy and its decision, if any strategy applies.
    #[must_use]
    pub fn decide(
        &self,
        condition: &AnalyzedCondition,
        target: Target<'_>,
    ) -> Option<(&'static str, bool)> {
        self.strategies.iter().find_map(|strategy| {
            strategy
                .decide(condition, target, &self.lexicon)
                .map(|decision| (strategy.name(), decision))
        })
    }

    #[must_use]
    pub fn matches_analyzed(&self, condition: &AnalyzedCondition, target: Target<'_>) -> bool {
        self.decide(condition, target).is_some_and(|(_, decision)| decision)
    }

    /// Whether `condition` applies to the variant `(size, color)`.
    #[must_use]
    pub fn matches(&self, condition: &str, size: Option<&str>, color: Option<&str>) -> bool {
        self.matches_analyzed(&self.analyze(condition), Target::new(size, color))
    }

    /// Name of the strategy that decides `condition` for this variant.
    #[must_use]
    pub fn explain(
        &self,
        condition: &str,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<&'static str> {
        self.decide(&self.analyze(condition), Target::new(size, color))
            .map(|(name, _)| name)
    }

    /// Whether a condition applies to every variant.
    #[must_use]
    pub fn is_universal(&self, condition: &AnalyzedCondition) -> bool {
        self.lexicon.vocabulary().is_universal(&condition.words)
    }
}
