//! Text folding shared by the matcher, the parsers and the tables.
//!
//! Folding lowercases and strips Turkish (and a few common Latin) diacritics
//! so that `KIRMIZI`, `kırmızı` and `kirmizi` all compare equal.

/// Lowercase `input` and strip diacritics.
#[must_use]
pub fn fold(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            'I' | 'İ' | 'ı' | 'î' | 'Î' | 'í' | 'ï' => out.push('i'),
            'ç' | 'Ç' => out.push('c'),
            'ğ' | 'Ğ' => out.push('g'),
            'ö' | 'Ö' | 'ó' | 'ô' => out.push('o'),
            'ş' | 'Ş' => out.push('s'),
            'ü' | 'Ü' | 'û' | 'Û' | 'ú' => out.push('u'),
            'â' | 'Â' | 'á' | 'à' | 'ä' => out.push('a'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'ñ' => out.push('n'),
            '’' | '‘' | '`' => out.push('\''),
            other => out.extend(other.to_lowercase()),
        }
    }
    out
}

/// Split folded text into words.
///
/// Anything that is not alphanumeric separates words, except `*`, which is a
/// word on its own. A bare count followed by `xl` is joined, so `2 xl` yields
/// the single word `2xl`.
#[must_use]
pub fn words(input: &str) -> Vec<String> {
    let folded = fold(input);
    let mut raw: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in folded.chars() {
        if c.is_alphanumeric() {
            current.push(c);
        } else {
            if !current.is_empty() {
                raw.push(std::mem::take(&mut current));
            }
            if c == '*' {
                raw.push("*".to_owned());
            }
        }
    }
    if !current.is_empty() {
        raw.push(current);
    }

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for word in raw {
        if word == "xl" {
            if let Some(prev) = out.last_mut() {
                if is_size_count(prev) {
                    prev.push_str("xl");
                    continue;
                }
            }
        }
        out.push(word);
    }
    out
}

/// A single digit from 2 to 9, the only counts that prefix `xl`.
pub(crate) fn is_size_count(word: &str) -> bool {
    word.len() == 1 && matches!(word.as_bytes()[0], b'2'..=b'9')
}

/// Whether `needle` occurs in `haystack` as a contiguous run of whole words.
#[must_use]
pub fn contains_phrase<S: AsRef<str>>(haystack: &[S], needle: &[S]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.as_ref() == b.as_ref())
    })
}

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
