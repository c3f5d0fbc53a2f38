use super::color::ColorTable;
use super::size::SizeTable;
use super::vocabulary::Vocabulary;

/// The immutable tables every component consults: sizes, colors and the
/// folded vocabulary. Built once per engine and shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub sizes: SizeTable,
    pub colors: ColorTable,
    vocabulary: Vocabulary,
}

impl Lexicon {
    #[must_use]
    pub fn new(sizes: SizeTable, colors: ColorTable, vocabulary: &Vocabulary) -> Self {
        Self {
            sizes,
            colors,
            vocabulary: vocabulary.normalized(),
        }
    }

    /// The vocabulary with every entry folded.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(SizeTable::standard(), ColorTable::standard(), &Vocabulary::default())
    }
}
