use serde::{Deserialize, Serialize};

use super::text::{contains_phrase, fold, words};

/// Word lists the matcher and the deterministic parser recognise.
///
/// Entries are folded (see [`fold`]) by [`Vocabulary::normalized`] before use,
/// so configuration files may spell them with diacritics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Conditions made only of these words (and filler) apply to every variant.
    pub universal: Vec<String>,
    /// Words with no meaning inside a condition.
    pub filler: Vec<String>,
    /// Open-ended range phrases following a size: "XL ve üzeri".
    pub open_range: Vec<String>,
    /// Words that mark a condition as size-scoped even without a token.
    pub size_words: Vec<String>,
    /// Ablative suffixes that open a size range: "S'den".
    pub range_from: Vec<String>,
    /// Connectors between range bounds: "S to XL", "S ile XL".
    pub range_connectors: Vec<String>,
    pub price_keywords: Vec<String>,
    pub currency: Vec<String>,
    pub stock_keywords: Vec<String>,
    /// Count units that follow a stock number: "10 adet".
    pub stock_units: Vec<String>,
    pub compare_keywords: Vec<String>,
    pub increase: Vec<String>,
    pub decrease: Vec<String>,
    /// Color values that mean "no color was given".
    pub placeholder_colors: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            universal: owned(&[
                "all", "every", "each", "everything", "*", "tum", "tumu", "hepsi", "hepsine",
                "genel", "her", "herbiri", "birinden", "varyant", "varyantlar", "variants",
                "urun", "urunler", "products",
            ]),
            filler: owned(&[
                "icin", "for", "olan", "olanlar", "ise", "the", "on", "de", "da", "sizes",
                "bedenler", "renkler", "colors",
            ]),
            open_range: owned(&[
                "ve uzeri", "ve ustu", "ve sonrasi", "ve yukarisi", "den buyuk", "dan buyuk",
                "ten buyuk", "tan buyuk", "and above", "and up", "and larger", "and bigger",
                "or larger", "or bigger", "or above", "plus",
            ]),
            size_words: owned(&["beden", "size", "boyut"]),
            range_from: owned(&["den", "dan", "ten", "tan", "from"]),
            range_connectors: owned(&["to", "ile", "through", "thru", "until", "arasi"]),
            price_keywords: owned(&[
                "fiyat", "fiyati", "fiyatlar", "price", "satis", "tutar", "ucret", "cost",
            ]),
            currency: owned(&[
                "tl", "lira", "try", "usd", "eur", "euro", "dolar", "dollar", "$", "₺", "€",
            ]),
            stock_keywords: owned(&["stok", "stock", "stogu", "envanter", "inventory", "qty"]),
            stock_units: owned(&[
                "adet", "tane", "pcs", "pc", "units", "unit", "pieces", "piece", "quantity",
            ]),
            compare_keywords: owned(&[
                "eski fiyat", "eski fiyati", "indirimsiz", "ustu cizili", "liste fiyati",
                "piyasa fiyati", "compare at", "compare", "was", "original price",
            ]),
            increase: owned(&[
                "zam", "fazla", "artis", "ekle", "pahali", "more", "extra", "increase", "markup",
                "surcharge",
            ]),
            decrease: owned(&[
                "indirim", "indirimli", "eksik", "ucuz", "azalt", "discount", "off", "less",
                "decrease", "reduce", "cheaper",
            ]),
            placeholder_colors: owned(&[
                "default", "standard", "standart", "varsayilan", "unspecified", "belirtilmemis",
                "none", "yok", "tek renk", "n/a", "na", "-",
            ]),
        }
    }
}

impl Vocabulary {
    /// A copy with every entry folded and blank entries removed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let fold_all = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| fold(s.trim()))
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            universal: fold_all(&self.universal),
            filler: fold_all(&self.filler),
            open_range: fold_all(&self.open_range),
            size_words: fold_all(&self.size_words),
            range_from: fold_all(&self.range_from),
            range_connectors: fold_all(&self.range_connectors),
            price_keywords: fold_all(&self.price_keywords),
            currency: fold_all(&self.currency),
            stock_keywords: fold_all(&self.stock_keywords),
            stock_units: fold_all(&self.stock_units),
            compare_keywords: fold_all(&self.compare_keywords),
            increase: fold_all(&self.increase),
            decrease: fold_all(&self.decrease),
            placeholder_colors: fold_all(&self.placeholder_colors),
        }
    }

    /// Whether a condition's words denote "all variants".
    ///
    /// An empty condition counts as universal; so does one made only of
    /// universal and filler words.
    #[must_use]
    pub fn is_universal(&self, condition_words: &[String]) -> bool {
        condition_words
            .iter()
            .all(|w| self.universal.contains(w) || self.filler.contains(w))
    }

    /// Whether a whole label is a placeholder color ("Standart", "default").
    #[must_use]
    pub fn is_placeholder_color(&self, label: &str) -> bool {
        let folded = fold(label.trim());
        folded.is_empty() || self.placeholder_colors.contains(&folded)
    }

    /// First open-range phrase found in the words, with its start position.
    #[must_use]
    pub fn open_range_in(&self, condition_words: &[String]) -> Option<usize> {
        self.open_range.iter().find_map(|phrase| {
            let parts = words(phrase);
            if parts.is_empty() {
                return None;
            }
            condition_words
                .windows(parts.len())
                .position(|w| w == &parts[..])
        })
    }

    /// Whether any compare-at phrase occurs in the words.
    #[must_use]
    pub fn mentions_compare(&self, clause_words: &[String]) -> bool {
        self.compare_keywords
            .iter()
            .any(|phrase| contains_phrase(clause_words, &words(phrase)[..]))
    }

    pub(crate) fn is_currency(&self, word: &str) -> bool {
        self.currency.iter().any(|c| c == word)
            || self
                .currency
                .iter()
                .any(|c| c.len() > 2 && word.starts_with(c.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_conditions() {
        let vocab = Vocabulary::default().normalized();
        assert!(vocab.is_universal(&words("all")));
        assert!(vocab.is_universal(&words("Tümü için")));
        assert!(vocab.is_universal(&words("*")));
        assert!(vocab.is_universal(&[]));
        assert!(!vocab.is_universal(&words("2XL")));
    }

    #[test]
    fn placeholder_colors_detected() {
        let vocab = Vocabulary::default().normalized();
        assert!(vocab.is_placeholder_color("Standart"));
        assert!(vocab.is_placeholder_color("Varsayılan"));
        assert!(vocab.is_placeholder_color("  "));
        assert!(!vocab.is_placeholder_color("Kırmızı"));
    }

    #[test]
    fn open_range_phrase_position() {
        let vocab = Vocabulary::default().normalized();
        assert_eq!(vocab.open_range_in(&words("2XL ve üzeri")), Some(1));
        assert_eq!(vocab.open_range_in(&words("XL'den büyük")), Some(1));
        assert_eq!(vocab.open_range_in(&words("XL and above")), Some(1));
        assert_eq!(vocab.open_range_in(&words("XL")), None);
    }

    #[test]
    fn currency_accepts_inflected_forms() {
        let vocab = Vocabulary::default().normalized();
        assert!(vocab.is_currency("tl"));
        assert!(vocab.is_currency("liradan"));
        assert!(!vocab.is_currency("tlx") && !vocab.is_currency("kirmizi"));
    }

    #[test]
    fn normalized_folds_entries() {
        let vocab = Vocabulary {
            universal: vec!["Tümü".into(), "  ".into()],
            ..Vocabulary::default()
        }
        .normalized();
        assert_eq!(vocab.universal, vec!["tumu"]);
    }
}
