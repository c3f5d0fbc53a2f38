use std::fmt;
use std::time::Duration;

use super::variant::{Variant, VariantId};

/// Where a variant's stock figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSource {
    /// `defaultStock`, or 0 when absent.
    Default,
    /// A stock rule whose condition applies to every variant.
    General(usize),
    /// A stock rule matching this (size, color) specifically.
    Specific(usize),
}

impl fmt::Display for StockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockSource::Default => write!(f, "default"),
            StockSource::General(i) => write!(f, "general rule #{i}"),
            StockSource::Specific(i) => write!(f, "specific rule #{i}"),
        }
    }
}

/// Which rules shaped one variant. Indices point into the rule set's
/// `priceRules`, `compareAtPriceRules` and `stockRules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTrace {
    pub id: VariantId,
    /// Price rules that matched, in application order.
    pub price_rules: Vec<usize>,
    /// The compare-at rule that won, if any rule matched.
    pub compare_rule: Option<usize>,
    pub stock: StockSource,
}

/// Detailed expansion report returned by
/// [`Engine::build_detailed()`](crate::Engine::build_detailed).
///
/// Carries the variants, one trace per variant in the same order, and the
/// wall-clock duration of the expansion.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExpansionReport {
    variants: Vec<Variant>,
    traces: Vec<VariantTrace>,
    duration: Duration,
}

impl ExpansionReport {
    pub(crate) fn new(
        variants: Vec<Variant>,
        traces: Vec<VariantTrace>,
        duration: Duration,
    ) -> Self {
        Self {
            variants,
            traces,
            duration,
        }
    }

    /// The variants, identical to [`Engine::build()`](crate::Engine::build).
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub fn traces(&self) -> &[VariantTrace] {
        &self.traces
    }

    /// Trace for one variant id.
    #[must_use]
    pub fn trace_of(&self, id: &VariantId) -> Option<&VariantTrace> {
        self.traces.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }
}

impl fmt::Display for ExpansionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variants: {}", self.variants.len())?;
        for (variant, trace) in self.variants.iter().zip(&self.traces) {
            let fired: Vec<String> = trace.price_rules.iter().map(|i| format!("#{i}")).collect();
            write!(
                f,
                "\n  {} {}: price {} [{}], stock {} ({})",
                variant.id,
                variant.label(),
                variant.price,
                fired.join(", "),
                variant.stock,
                trace.stock,
            )?;
        }
        write!(f, "\nduration: {:?}", self.duration)
    }
}
