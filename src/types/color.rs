use serde::{Deserialize, Serialize};

use super::text::{contains_phrase, fold, words};
use crate::config::ConfigError;

/// One color and every spelling that names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Canonical English name, used in logs.
    pub name: String,
    /// Folded spellings, each one or more words.
    pub synonyms: Vec<String>,
}

impl ColorEntry {
    pub fn new<I, S>(name: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut folded: Vec<String> = vec![fold(&name)];
        for synonym in synonyms {
            let s = fold(synonym.as_ref().trim());
            if !s.is_empty() && !folded.contains(&s) {
                folded.push(s);
            }
        }
        Self {
            name,
            synonyms: folded,
        }
    }

    fn named_in(&self, condition_words: &[String]) -> bool {
        self.synonyms
            .iter()
            .any(|s| contains_phrase(condition_words, &words(s)[..]))
    }
}

/// Bilingual (Turkish / English) color synonym table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColorEntry>", into = "Vec<ColorEntry>")]
pub struct ColorTable {
    entries: Vec<ColorEntry>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColorTable {
    #[must_use]
    pub fn standard() -> Self {
        let entries = vec![
            ColorEntry::new("Red", ["kırmızı", "kirmizi", "kirmisi"]),
            ColorEntry::new("Green", ["yeşil", "yesil"]),
            ColorEntry::new("Khaki", ["haki"]),
            ColorEntry::new("Blue", ["mavi"]),
            ColorEntry::new("Yellow", ["sarı", "sari"]),
            ColorEntry::new("Purple", ["mor"]),
            ColorEntry::new("Violet", ["menekşe", "menekse"]),
            ColorEntry::new("Lilac", ["lila"]),
            ColorEntry::new("Black", ["siyah", "kara"]),
            ColorEntry::new("White", ["beyaz"]),
            ColorEntry::new("Gray", ["grey", "gri"]),
            ColorEntry::new("Smoke", ["füme", "fume"]),
            ColorEntry::new("Orange", ["turuncu", "oranj"]),
            ColorEntry::new("Pink", ["pembe"]),
            ColorEntry::new("Navy", ["lacivert", "navy blue"]),
            ColorEntry::new("Brown", ["kahverengi"]),
            ColorEntry::new("Coffee", ["kahve"]),
            ColorEntry::new("Beige", ["bej"]),
            ColorEntry::new("Cream", ["krem"]),
        ];
        Self { entries }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateColorSynonym`] when one spelling is
    /// claimed by two entries.
    pub fn new(entries: Vec<ColorEntry>) -> Result<Self, ConfigError> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &entries {
            for synonym in &entry.synonyms {
                if seen.contains(&synonym.as_str()) {
                    return Err(ConfigError::DuplicateColorSynonym {
                        synonym: synonym.clone(),
                    });
                }
                seen.push(synonym);
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    /// The entry a whole color label belongs to (`"Kırmızı"` -> Red).
    #[must_use]
    pub fn entry_of(&self, label: &str) -> Option<usize> {
        let folded = fold(label.trim());
        self.entries
            .iter()
            .position(|e| e.synonyms.iter().any(|s| *s == folded))
    }

    /// Entries named anywhere in a word list, in table order.
    #[must_use]
    pub fn named_in(&self, condition_words: &[String]) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.named_in(condition_words))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether two labels name the same color: equal after folding, or
    /// synonyms of one entry.
    #[must_use]
    pub fn same_color(&self, a: &str, b: &str) -> bool {
        if fold(a.trim()) == fold(b.trim()) {
            return true;
        }
        match (self.entry_of(a), self.entry_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Longest synonym (in words) that starts at `words[at]`, with its entry.
    pub(crate) fn match_at(&self, text_words: &[String], at: usize) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            for synonym in &entry.synonyms {
                let parts = words(synonym);
                let len = parts.len();
                if len == 0 || at + len > text_words.len() {
                    continue;
                }
                if text_words[at..at + len] == parts[..] && best.map_or(true, |(_, l)| len > l) {
                    best = Some((index, len));
                }
            }
        }
        best
    }
}

impl TryFrom<Vec<ColorEntry>> for ColorTable {
    type Error = ConfigError;

    fn try_from(entries: Vec<ColorEntry>) -> Result<Self, Self::Error> {
        if entries.is_empty() {
            return Ok(Self::standard());
        }
        let entries = entries
            .into_iter()
            .map(|e| ColorEntry::new(e.name, e.synonyms))
            .collect();
        Self::new(entries)
    }
}

impl From<ColorTable> for Vec<ColorEntry> {
    fn from(table: ColorTable) -> Self {
        table.entries
    }
}
