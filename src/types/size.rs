use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::UnknownSizeToken;
use super::text::fold;
use crate::config::ConfigError;

const STANDARD_TOKENS: [&str; 9] = ["XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL"];

const STANDARD_ALIASES: [(&str, &str); 4] = [
    ("XXL", "2XL"),
    ("XXXL", "3XL"),
    ("XXXXL", "4XL"),
    ("XXXXXL", "5XL"),
];

/// The ordered enumeration of size tokens, smallest first.
///
/// Lookups normalize their input (uppercase, no whitespace, aliases resolved),
/// so `" xl "`, `"Xl"` and `"XL"` are the same token and `"xxl"` is `2XL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSizeTable", into = "RawSizeTable")]
pub struct SizeTable {
    tokens: Vec<String>,
    aliases: BTreeMap<String, String>,
    /// Indices into `tokens`, longest token string first.
    scan_order: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawSizeTable {
    tokens: Vec<String>,
    aliases: BTreeMap<String, String>,
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SizeTable {
    /// XS, S, M, L, XL, 2XL, 3XL, 4XL, 5XL with the `XXL`-style aliases.
    #[must_use]
    pub fn standard() -> Self {
        let tokens: Vec<String> = STANDARD_TOKENS.iter().map(|t| (*t).to_owned()).collect();
        let aliases = STANDARD_ALIASES
            .iter()
            .map(|(a, t)| ((*a).to_owned(), (*t).to_owned()))
            .collect();
        let scan_order = scan_order(&tokens);
        Self {
            tokens,
            aliases,
            scan_order,
        }
    }

    /// Build a custom table from tokens in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the table is empty, a token repeats, or an
    /// alias points at a token that is not in the table.
    pub fn new<I, S>(tokens: I, aliases: BTreeMap<String, String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| squash(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(ConfigError::EmptySizeTable);
        }
        for (i, token) in tokens.iter().enumerate() {
            if tokens[..i].contains(token) {
                return Err(ConfigError::DuplicateSizeToken {
                    token: token.clone(),
                });
            }
        }
        let mut normalized = BTreeMap::new();
        for (alias, target) in aliases {
            let target = squash(&target);
            if !tokens.contains(&target) {
                return Err(ConfigError::UnknownAliasTarget { alias, target });
            }
            normalized.insert(squash(&alias), target);
        }
        let scan_order = scan_order(&tokens);
        Ok(Self {
            tokens,
            aliases: normalized,
            scan_order,
        })
    }

    /// Tokens in ordinal order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Canonical spelling of `raw`: uppercase, whitespace removed, alias resolved.
    /// The result is not necessarily a token of this table.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let squashed = squash(raw);
        match self.aliases.get(&squashed) {
            Some(target) => target.clone(),
            None => squashed,
        }
    }

    /// Position of `raw` in the ordinal table.
    #[must_use]
    pub fn index_of(&self, raw: &str) -> Option<usize> {
        let token = self.normalize(raw);
        self.tokens.iter().position(|t| *t == token)
    }

    /// The canonical token for `raw`, if it is in the table.
    #[must_use]
    pub fn token(&self, raw: &str) -> Option<&str> {
        self.index_of(raw).map(|i| self.tokens[i].as_str())
    }

    /// Inclusive run of tokens between two bounds, in ascending order.
    ///
    /// Bounds given high-to-low are swapped.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSizeToken`] for the first bound missing from the table.
    pub fn range(&self, start: &str, end: &str) -> Result<Vec<String>, UnknownSizeToken> {
        let from = self
            .index_of(start)
            .ok_or_else(|| UnknownSizeToken::new(start))?;
        let to = self.index_of(end).ok_or_else(|| UnknownSizeToken::new(end))?;
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        Ok(self.tokens[lo..=hi].to_vec())
    }

    /// Tokens ordered by string length, longest first, so `2XL` is tried
    /// before `L` and `XL`.
    pub fn scan_longest_first(&self) -> impl Iterator<Item = &str> {
        self.scan_order.iter().map(|&i| self.tokens[i].as_str())
    }

    /// Sort key for a size label: its ordinal, or past the end for labels the
    /// table does not know.
    #[must_use]
    pub fn ordinal_or_last(&self, raw: &str) -> usize {
        self.index_of(raw).unwrap_or(self.tokens.len())
    }

    /// Whether a word looks like a size even if the table lacks it (`7xl`).
    #[must_use]
    pub fn is_size_like(&self, word: &str) -> bool {
        if self.index_of(word).is_some() {
            return true;
        }
        let folded = fold(word);
        match folded.strip_suffix("xl") {
            Some("") => true,
            Some(prefix) => prefix.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }
}

fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn scan_order(tokens: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tokens.len()).collect();
    // Stable: equal lengths keep ordinal order.
    order.sort_by(|&a, &b| tokens[b].len().cmp(&tokens[a].len()));
    order
}

impl TryFrom<RawSizeTable> for SizeTable {
    type Error = ConfigError;

    fn try_from(raw: RawSizeTable) -> Result<Self, Self::Error> {
        if raw.tokens.is_empty() && raw.aliases.is_empty() {
            return Ok(Self::standard());
        }
        Self::new(raw.tokens, raw.aliases)
    }
}

impl From<SizeTable> for RawSizeTable {
    fn from(table: SizeTable) -> Self {
        Self {
            tokens: table.tokens,
            aliases: table.aliases,
        }
    }
}
