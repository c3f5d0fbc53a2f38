mod color;
mod error;
mod lexicon;
mod report;
mod rule;
mod ruleset;
mod size;
pub(crate) mod text;
mod variant;
mod vocabulary;

pub use color::{ColorEntry, ColorTable};
pub use error::{Dimension, ProblemKind, UnknownSizeToken, ValidationErrors, ValidationProblem};
pub use lexicon::Lexicon;
pub use report::{ExpansionReport, StockSource, VariantTrace};
pub use rule::{Adjustment, CompareRule, PriceRule, StockRule};
pub use ruleset::{RuleSet, RuleSetBuilder};
pub use size::SizeTable;
pub use text::{fold, words};
pub use variant::{Variant, VariantId, VariantKey, VariantOverride};
pub(crate) use variant::round_money;
pub use vocabulary::Vocabulary;
