use rust_decimal::Decimal;
use winnow::ascii::digit1;
use winnow::combinator::{alt, preceded, repeat};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::types::fold;
use crate::types::text::is_size_count;

/// A lexical unit of a merchant prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `folded` is compared against the vocabulary; `raw` keeps the
    /// merchant's spelling for display. `suffix` marks the tail of an
    /// apostrophe split (`den` in `S'den`, `s` in `men's`).
    Word {
        folded: String,
        raw: String,
        suffix: bool,
    },
    Number(Decimal),
    Percent,
    Plus,
    Minus,
    /// `,` `;` `.` `!` `?` or a newline.
    Separator,
}

impl Token {
    pub(crate) fn word(&self) -> Option<&str> {
        match self {
            Token::Word { folded, .. } => Some(folded),
            _ => None,
        }
    }

    pub(crate) fn number(&self) -> Option<Decimal> {
        match self {
            Token::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub(crate) fn is_suffix(&self) -> bool {
        matches!(self, Token::Word { suffix: true, .. })
    }

    fn word_of(raw: &str) -> Self {
        Token::Word {
            folded: fold(raw),
            raw: raw.to_owned(),
            suffix: false,
        }
    }

    fn suffix_of(raw: &str) -> Self {
        Token::Word {
            folded: fold(raw),
            raw: raw.to_owned(),
            suffix: true,
        }
    }
}

const APOSTROPHES: [char; 3] = ['\'', '\u{2019}', '`'];

// -- Pieces -----------------------------------------------------------------

fn blank(input: &mut &str) -> ModalResult<Option<Token>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(None)
        .parse_next(input)
}

fn separator(input: &mut &str) -> ModalResult<Option<Token>> {
    one_of(['\n', ',', ';', '.', '!', '?'])
        .value(Some(Token::Separator))
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<Option<Token>> {
    (digit1, repeat::<_, _, (), _, _>(0.., (one_of(['.', ',']), digit1)))
        .take()
        .try_map(parse_amount)
        .map(|n| Some(Token::Number(n)))
        .parse_next(input)
}

fn symbol(input: &mut &str) -> ModalResult<Option<Token>> {
    alt((
        '%'.value(Token::Percent),
        '+'.value(Token::Plus),
        '-'.value(Token::Minus),
        one_of(['₺', '$', '€', '£', '*']).map(|c: char| Token::word_of(&c.to_string())),
    ))
    .map(Some)
    .parse_next(input)
}

/// A word and any apostrophe-attached tails: `XL'den` is `xl` + suffix `den`.
fn word(input: &mut &str) -> ModalResult<Vec<Token>> {
    (
        take_while(1.., char::is_alphanumeric),
        repeat::<_, _, Vec<&str>, _, _>(
            0..,
            preceded(one_of(APOSTROPHES), take_while(1.., char::is_alphanumeric)),
        ),
    )
        .map(|(stem, tails): (&str, Vec<&str>)| {
            std::iter::once(Token::word_of(stem))
                .chain(tails.into_iter().map(Token::suffix_of))
                .collect()
        })
        .parse_next(input)
}

fn one(token: Option<Token>) -> Vec<Token> {
    token.into_iter().collect()
}

fn token(input: &mut &str) -> ModalResult<Vec<Token>> {
    alt((
        blank.map(one),
        separator.map(one),
        number.map(one),
        symbol.map(one),
        word,
        // Stray apostrophes, quotes, slashes: they only split words.
        any.value(Vec::new()),
    ))
    .parse_next(input)
}

/// Read a price-like figure: `200`, `19,90`, `19.90`, `1.250`, `1.250,50`.
///
/// With both separators present the last one is the decimal point. A single
/// separator followed by exactly three digits groups thousands; a repeated
/// separator always does.
fn parse_amount(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let dots = raw.matches('.').count();
    let commas = raw.matches(',').count();
    let normalized: String = if dots > 0 && commas > 0 {
        let decimal = if raw.rfind('.') > raw.rfind(',') { '.' } else { ',' };
        raw.chars()
            .filter(|c| c.is_ascii_digit() || *c == decimal)
            .map(|c| if c == decimal { '.' } else { c })
            .collect()
    } else if dots + commas == 0 {
        raw.to_owned()
    } else {
        let sep = if dots > 0 { '.' } else { ',' };
        let tail = raw.rsplit(sep).next().unwrap_or_default();
        if dots + commas > 1 || tail.len() == 3 {
            raw.chars().filter(char::is_ascii_digit).collect()
        } else {
            raw.replace(sep, ".")
        }
    };
    normalized.parse()
}

/// Split a prompt into tokens. Never fails: unrecognised characters are
/// dropped.
pub(crate) fn lex(prompt: &str) -> Vec<Token> {
    let mut input = prompt;
    let tokens: Vec<Vec<Token>> = repeat(0.., token)
        .parse_next(&mut input)
        .unwrap_or_default();
    join_size_counts(tokens.into_iter().flatten().collect())
}

/// `2 XL` and `2XL` both become the single word `2xl`.
fn join_size_counts(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Token::Word { folded, raw, .. } = &token {
            if folded == "xl" {
                if let Some(Token::Number(n)) = out.last() {
                    let count = n.to_string();
                    if n.scale() == 0 && is_size_count(&count) {
                        let joined = Token::Word {
                            folded: format!("{count}xl"),
                            raw: format!("{count}{raw}"),
                            suffix: false,
                        };
                        out.pop();
                        out.push(joined);
                        continue;
                    }
                }
            }
        }
        out.push(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().filter_map(Token::word).collect()
    }

    fn numbers(tokens: &[Token]) -> Vec<Decimal> {
        tokens.iter().filter_map(Token::number).collect()
    }

    #[test]
    fn words_are_folded_but_keep_raw_spelling() {
        let tokens = lex("Kırmızı");
        assert_eq!(
            tokens,
            vec![Token::Word {
                folded: "kirmizi".into(),
                raw: "Kırmızı".into(),
                suffix: false,
            }]
        );
    }

    #[test]
    fn apostrophes_split_suffixes() {
        assert_eq!(words(&lex("S'den XL'e kadar")), ["s", "den", "xl", "e", "kadar"]);
    }

    #[test]
    fn apostrophe_tails_are_marked() {
        let tokens = lex("men's tee, XL'den");
        let marked: Vec<bool> = tokens.iter().map(Token::is_suffix).collect();
        assert_eq!(words(&tokens), ["men", "s", "tee", "xl", "den"]);
        assert_eq!(marked, [false, true, false, false, false, true]);
    }

    #[test]
    fn quoted_words_are_not_suffixes() {
        let tokens = lex("beden 'S'");
        assert_eq!(words(&tokens), ["beden", "s"]);
        assert!(!tokens[1].is_suffix());
    }

    #[test]
    fn size_counts_join() {
        assert_eq!(words(&lex("2 XL ve üzeri")), ["2xl", "ve", "uzeri"]);
        assert_eq!(words(&lex("3XL'den büyük")), ["3xl", "den", "buyuk"]);
        assert_eq!(numbers(&lex("20 xl")), [Decimal::from(20)]);
    }

    #[test]
    fn number_forms() {
        assert_eq!(numbers(&lex("200")), [Decimal::from(200)]);
        assert_eq!(numbers(&lex("19,90")), [Decimal::new(1990, 2)]);
        assert_eq!(numbers(&lex("19.90")), [Decimal::new(1990, 2)]);
        assert_eq!(numbers(&lex("1.250")), [Decimal::from(1250)]);
        assert_eq!(numbers(&lex("1.250,50")), [Decimal::new(125050, 2)]);
        assert_eq!(numbers(&lex("1,250.50")), [Decimal::new(125050, 2)]);
        assert_eq!(numbers(&lex("1.000.000")), [Decimal::from(1_000_000)]);
    }

    #[test]
    fn trailing_separator_is_not_a_decimal_point() {
        let tokens = lex("fiyat 200, stok 10.");
        assert_eq!(numbers(&tokens), [Decimal::from(200), Decimal::from(10)]);
        assert_eq!(tokens.iter().filter(|t| **t == Token::Separator).count(), 2);
    }

    #[test]
    fn symbols() {
        let tokens = lex("+%10 -5 ₺");
        assert_eq!(tokens[0], Token::Plus);
        assert_eq!(tokens[1], Token::Percent);
        assert_eq!(tokens[2], Token::Number(Decimal::from(10)));
        assert_eq!(tokens[3], Token::Minus);
        assert_eq!(tokens[5].word(), Some("₺"));
    }

    #[test]
    fn ranges_with_dash() {
        let tokens = lex("S-XL");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Minus);
    }

    #[test]
    fn empty_and_noise_input() {
        assert!(lex("").is_empty());
        assert!(lex("  '' \"\" / ").is_empty());
    }
}
