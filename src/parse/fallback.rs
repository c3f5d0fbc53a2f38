//! Rule-based prompt scan used when assisted extraction is unavailable.
//!
//! The prompt is lexed and split into clauses at separators. Within a clause,
//! rules are found in a fixed order: compare-at price, stock, price
//! adjustment, base price. Each rule claims only the tokens it spans (its
//! keyword, its number and the condition next to it). Runs of unclaimed
//! tokens are declarations and feed size and color detection, so a prompt
//! with no separators at all still parses.

use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::error::ParseFailure;
use super::lexer::{lex, Token};
use super::PromptParser;
use crate::config::FallbackMode;
use crate::types::text::title_case;
use crate::types::{words, Adjustment, Lexicon, RuleSet, RuleSetBuilder};

/// Words that chain sizes or colors inside one condition.
const JOINERS: [&str; 5] = ["ve", "and", "veya", "or", "ile"];

/// Deterministic, offline prompt parser. Never fails.
#[derive(Debug, Clone)]
pub struct DeterministicParser {
    lexicon: Arc<Lexicon>,
    mode: FallbackMode,
}

/// What one clause contributed.
#[derive(Debug, Default)]
struct Findings {
    ranges: Vec<Vec<String>>,
    sizes: Vec<String>,
    colors: Vec<(usize, String)>,
    base_price: Option<Decimal>,
    compare_at_price: Option<Decimal>,
    compare_rules: Vec<(String, Decimal)>,
    default_stock: Option<u32>,
    stock_rules: Vec<(String, u32)>,
    price_rules: Vec<(String, Adjustment)>,
}

impl DeterministicParser {
    #[must_use]
    pub fn new(lexicon: Arc<Lexicon>, mode: FallbackMode) -> Self {
        Self { lexicon, mode }
    }

    #[must_use]
    pub fn mode(&self) -> FallbackMode {
        self.mode
    }

    /// Scan a prompt into a rule set. Unrecognised input yields empty or
    /// absent fields.
    #[must_use]
    pub fn scan(&self, prompt: &str) -> RuleSet {
        let tokens = lex(prompt);
        let mut found = Findings::default();
        for clause in tokens.split(|t| *t == Token::Separator) {
            if !clause.is_empty() {
                self.scan_clause(clause, &mut found);
            }
        }
        self.assemble(found)
    }

    fn scan_clause(&self, clause: &[Token], found: &mut Findings) {
        let mut consumed = vec![false; clause.len()];
        self.compare_rules(clause, &mut consumed, found);
        self.stock_rules(clause, &mut consumed, found);
        self.adjustments(clause, &mut consumed, found);
        self.base_price(clause, &mut consumed, found);

        // Declarations are read per run of unclaimed tokens.
        let mut run: Vec<&Token> = Vec::new();
        for (token, used) in clause.iter().zip(&consumed) {
            if *used {
                self.declarations(&run, found);
                run.clear();
            } else {
                run.push(token);
            }
        }
        self.declarations(&run, found);
    }

    // -- Rules -------------------------------------------------------------

    fn compare_rules(&self, clause: &[Token], consumed: &mut [bool], found: &mut Findings) {
        let vocab = self.lexicon.vocabulary();
        let mut i = 0;
        while i < clause.len() {
            let Some(len) = phrase_at(clause, consumed, i, &vocab.compare_keywords) else {
                i += 1;
                continue;
            };
            let end = i + len;
            let amount = self
                .amount_after(clause, consumed, end)
                .or_else(|| self.amount_before(clause, consumed, i));
            let Some(at) = amount else {
                i = end;
                continue;
            };
            mark(consumed, i..end);
            let (lo, hi) = self.claim_amount(clause, consumed, at);
            let value = clause[at].number().unwrap_or_default();
            let start = lo.min(i);
            match self.condition_before(clause, consumed, start, false) {
                Some((from, condition)) if !self.is_universal(&condition) => {
                    mark(consumed, from..start);
                    found.compare_rules.push((condition, value));
                }
                _ => {
                    found.compare_at_price.get_or_insert(value);
                }
            }
            i = hi.max(end);
        }
    }

    fn stock_rules(&self, clause: &[Token], consumed: &mut [bool], found: &mut Findings) {
        let vocab = self.lexicon.vocabulary();
        let is_unit =
            |t: &Token| t.word().is_some_and(|w| vocab.stock_units.iter().any(|u| u == w));
        let mut i = 0;
        while i < clause.len() {
            if consumed[i] {
                i += 1;
                continue;
            }
            let keyword = clause[i]
                .word()
                .is_some_and(|w| vocab.stock_keywords.iter().any(|k| k == w));
            // (span start, span end, index of the quantity)
            let span = if keyword {
                if self.count_at(clause, consumed, i + 1) {
                    Some((i, i + 2, i + 1))
                } else if i > 0 && self.count_at(clause, consumed, i - 1) {
                    Some((i - 1, i + 1, i - 1))
                } else {
                    None
                }
            } else if is_unit(&clause[i]) && i > 0 && self.count_at(clause, consumed, i - 1) {
                Some((i - 1, i + 1, i - 1))
            } else {
                None
            };
            let Some((start, mut end, at)) = span else {
                i += 1;
                continue;
            };
            if clause.get(end).is_some_and(|t| is_unit(t)) && !consumed[end] {
                end += 1;
            }
            mark(consumed, start..end);
            let quantity = clause[at]
                .number()
                .and_then(|n| n.trunc().to_u32())
                .unwrap_or(u32::MAX);

            match self.condition_before(clause, consumed, start, false) {
                Some((from, condition)) => {
                    mark(consumed, from..start);
                    if self.is_universal(&condition) {
                        found.default_stock.get_or_insert(quantity);
                    } else {
                        found.stock_rules.push((condition, quantity));
                    }
                }
                None => {
                    found.default_stock.get_or_insert(quantity);
                }
            }
            i = end;
        }
    }

    fn adjustments(&self, clause: &[Token], consumed: &mut [bool], found: &mut Findings) {
        let cores = self.adjustment_cores(clause, consumed);
        let last = cores.len().saturating_sub(1);
        for (n, (start, end, adjustment)) in cores.into_iter().enumerate() {
            // Direction and currency words around the core belong to it.
            let mut head = start;
            if head > 0 && !consumed[head - 1] && self.is_direction(&clause[head - 1]) {
                head -= 1;
            }
            let mut tail = end;
            while tail < clause.len()
                && !consumed[tail]
                && (self.is_direction(&clause[tail]) || self.is_currency(&clause[tail]))
            {
                tail += 1;
            }
            mark(consumed, head..tail);

            let before = self.condition_before(clause, consumed, head, true);
            let condition = if let Some((from, condition)) = before {
                mark(consumed, from..head);
                condition
            } else if n == last {
                match self.condition_after(clause, consumed, tail) {
                    Some((to, condition)) => {
                        mark(consumed, tail..to);
                        condition
                    }
                    None => String::new(),
                }
            } else {
                String::new()
            };
            let condition = if condition.is_empty() {
                "all".to_owned()
            } else {
                condition
            };
            found.price_rules.push((condition, adjustment));
        }
    }

    /// `(start, end, adjustment)` for every unclaimed adjustment core:
    /// `+%10`, `%10`, `10%`, `-5`, `+20 TL`, `20 TL indirim`.
    fn adjustment_cores(
        &self,
        clause: &[Token],
        consumed: &[bool],
    ) -> Vec<(usize, usize, Adjustment)> {
        let mut cores = Vec::new();
        let mut i = 0;
        while i < clause.len() {
            if consumed[i] {
                i += 1;
                continue;
            }
            let sign = match clause[i] {
                Token::Plus => Some(true),
                Token::Minus => Some(false),
                _ => None,
            };
            let skip = usize::from(sign.is_some());
            let rest = &clause[i + skip..];

            let pct = match rest {
                [Token::Percent, Token::Number(n), ..] | [Token::Number(n), Token::Percent, ..] => {
                    Some(*n)
                }
                _ => None,
            };
            if let Some(amount) = pct {
                let end = i + skip + 2;
                if !consumed[i..end].contains(&true) {
                    let increase = sign
                        .or_else(|| self.direction_near(clause, i, end))
                        .unwrap_or(true);
                    let adjustment = if increase {
                        Adjustment::IncreasePct(amount)
                    } else {
                        Adjustment::DecreasePct(amount)
                    };
                    cores.push((i, end, adjustment));
                    i = end;
                    continue;
                }
            }

            if let [Token::Number(amount), after @ ..] = rest {
                let end = i + skip + 1;
                let direction = self.direction_near(clause, i, end);
                let priced = after.first().is_some_and(|t| self.is_currency(t));
                if !consumed[i..end].contains(&true)
                    && (sign.is_some() || (priced && direction.is_some()))
                {
                    let adjustment = if sign.or(direction).unwrap_or(true) {
                        Adjustment::IncreaseAbs(*amount)
                    } else {
                        Adjustment::DecreaseAbs(*amount)
                    };
                    cores.push((i, end, adjustment));
                    i = end;
                    continue;
                }
            }
            i += 1;
        }
        cores
    }

    /// `Some(true)` for a surcharge word next to the core, `Some(false)` for
    /// a discount word. Currency words between the core and the word are
    /// skipped.
    fn direction_near(&self, clause: &[Token], start: usize, end: usize) -> Option<bool> {
        let vocab = self.lexicon.vocabulary();
        let direction = |t: &Token| {
            let w = t.word()?;
            if vocab.decrease.iter().any(|k| k == w) {
                Some(false)
            } else if vocab.increase.iter().any(|k| k == w) {
                Some(true)
            } else {
                None
            }
        };
        let after = clause[end..]
            .iter()
            .find(|t| !self.is_currency(t))
            .and_then(direction);
        after.or_else(|| start.checked_sub(1).and_then(|i| direction(&clause[i])))
    }

    fn base_price(&self, clause: &[Token], consumed: &mut [bool], found: &mut Findings) {
        if found.base_price.is_some() {
            return;
        }
        let vocab = self.lexicon.vocabulary();
        for k in 0..clause.len() {
            let keyword = !consumed[k]
                && clause[k]
                    .word()
                    .is_some_and(|w| vocab.price_keywords.iter().any(|p| p == w));
            if !keyword {
                continue;
            }
            let amount = self
                .amount_after(clause, consumed, k + 1)
                .or_else(|| self.amount_before(clause, consumed, k));
            if let Some(at) = amount {
                consumed[k] = true;
                self.claim_amount(clause, consumed, at);
                found.base_price = clause[at].number();
                return;
            }
        }
        for i in 0..clause.len() {
            if consumed[i] || clause[i].number().is_none() {
                continue;
            }
            let currency_after = clause.get(i + 1).is_some_and(|t| self.is_currency(t));
            let currency_before = i > 0 && self.is_currency(&clause[i - 1]);
            if currency_after || currency_before {
                self.claim_amount(clause, consumed, i);
                found.base_price = clause[i].number();
                return;
            }
        }
        // "price is 200": a keyword with the first free number somewhere after it.
        let keyword = (0..clause.len()).find(|&k| {
            !consumed[k]
                && clause[k]
                    .word()
                    .is_some_and(|w| vocab.price_keywords.iter().any(|p| p == w))
        });
        if let Some(k) = keyword {
            let number =
                (k + 1..clause.len()).find(|&i| !consumed[i] && clause[i].number().is_some());
            if let Some(at) = number {
                consumed[k] = true;
                self.claim_amount(clause, consumed, at);
                found.base_price = clause[at].number();
            }
        }
    }

    // -- Spans -------------------------------------------------------------

    /// Index of an unclaimed number at `at`, or right after a currency word.
    fn amount_after(&self, clause: &[Token], consumed: &[bool], at: usize) -> Option<usize> {
        let unclaimed_number = |i: usize| {
            clause.get(i).is_some_and(|t| t.number().is_some()) && !consumed[i]
        };
        if unclaimed_number(at) {
            Some(at)
        } else if clause.get(at).is_some_and(|t| self.is_currency(t)) && unclaimed_number(at + 1) {
            Some(at + 1)
        } else {
            None
        }
    }

    /// Index of an unclaimed number ending right before `at`, allowing a
    /// currency word in between.
    fn amount_before(&self, clause: &[Token], consumed: &[bool], at: usize) -> Option<usize> {
        let unclaimed_number = |i: usize| clause[i].number().is_some() && !consumed[i];
        if at >= 1 && unclaimed_number(at - 1) {
            Some(at - 1)
        } else if at >= 2 && self.is_currency(&clause[at - 1]) && unclaimed_number(at - 2) {
            Some(at - 2)
        } else {
            None
        }
    }

    /// Claim a number and its adjacent currency words. Returns the span.
    fn claim_amount(&self, clause: &[Token], consumed: &mut [bool], at: usize) -> (usize, usize) {
        let mut lo = at;
        let mut hi = at + 1;
        if lo > 0 && !consumed[lo - 1] && self.is_currency(&clause[lo - 1]) {
            lo -= 1;
        }
        if clause.get(hi).is_some_and(|t| self.is_currency(t)) && !consumed[hi] {
            hi += 1;
        }
        mark(consumed, lo..hi);
        (lo, hi)
    }

    /// An unclaimed integer usable as a stock count, not a percentage.
    fn count_at(&self, clause: &[Token], consumed: &[bool], at: usize) -> bool {
        let Some(n) = clause.get(at).and_then(Token::number) else {
            return false;
        };
        let percent = clause.get(at + 1) == Some(&Token::Percent)
            || (at > 0 && clause[at - 1] == Token::Percent);
        !consumed[at] && !percent && !n.is_sign_negative()
    }

    /// The condition a rule starting at `end` is scoped to, read backwards:
    /// an open range (`XL ve üzeri`), sizes joined by `ve`/`and`, colors
    /// joined the same way when `colors` is set, or "all" words. Returns the
    /// condition's first index and its text.
    fn condition_before(
        &self,
        clause: &[Token],
        consumed: &[bool],
        end: usize,
        colors: bool,
    ) -> Option<(usize, String)> {
        let vocab = self.lexicon.vocabulary();
        let free_word = |i: usize| (!consumed[i]).then(|| clause[i].word()).flatten();
        let mut stop = end;
        while stop > 0
            && free_word(stop - 1).is_some_and(|w| {
                vocab.filler.iter().any(|f| f == w) || vocab.size_words.iter().any(|s| s == w)
            })
        {
            stop -= 1;
        }

        let scoped =
            |from: usize| Some((from, self.condition_words(&clause[from..end], |_| false)));

        if let Some(tail) = self.open_range_ending_at(clause, consumed, stop) {
            if tail > 0 && self.condition_size_at(clause, consumed, tail - 1) {
                return scoped(tail - 1);
            }
        }
        if stop > 0 && self.condition_size_at(clause, consumed, stop - 1) {
            let mut from = stop - 1;
            while from >= 2
                && free_word(from - 1).is_some_and(is_joiner)
                && self.condition_size_at(clause, consumed, from - 2)
            {
                from -= 2;
            }
            return scoped(from);
        }
        if colors {
            if let Some(mut from) = self.color_ending_at(clause, consumed, stop) {
                while from >= 2 && free_word(from - 1).is_some_and(is_joiner) {
                    match self.color_ending_at(clause, consumed, from - 1) {
                        Some(earlier) => from = earlier,
                        None => break,
                    }
                }
                return scoped(from);
            }
        }
        let mut from = stop;
        while from > 0
            && free_word(from - 1).is_some_and(|w| vocab.universal.iter().any(|u| u == w))
        {
            from -= 1;
        }
        (from < stop).then(|| scoped(from)).flatten()
    }

    /// Like [`condition_before`](Self::condition_before), read forwards from
    /// `start` (`%15 indirim 2XL`). Returns the condition's end index.
    fn condition_after(
        &self,
        clause: &[Token],
        consumed: &[bool],
        start: usize,
    ) -> Option<(usize, String)> {
        let vocab = self.lexicon.vocabulary();
        let free_word = |i: usize| {
            clause
                .get(i)
                .filter(|_| !consumed[i])
                .and_then(Token::word)
        };
        let is_filler = |w: &str| {
            vocab.filler.iter().any(|f| f == w) || vocab.size_words.iter().any(|s| s == w)
        };
        let mut from = start;
        while free_word(from).is_some_and(is_filler) {
            from += 1;
        }
        let mut to = from;
        if self.condition_size_at(clause, consumed, from) && !self.opens_range(clause, from) {
            to = from + 1;
            if let Some(len) = phrase_at(clause, consumed, to, &vocab.open_range) {
                to += len;
            }
        } else if self.color_starting_at(clause, consumed, from).is_some() {
            while let Some(len) = self.color_starting_at(clause, consumed, to) {
                to += len;
                if free_word(to).is_some_and(is_joiner)
                    && self.color_starting_at(clause, consumed, to + 1).is_some()
                {
                    to += 1;
                } else {
                    break;
                }
            }
        } else {
            while free_word(to).is_some_and(|w| vocab.universal.iter().any(|u| u == w)) {
                to += 1;
            }
        }
        while free_word(to).is_some_and(is_filler) {
            to += 1;
        }
        (to > from).then(|| (to, self.condition_words(&clause[from..to], |_| false)))
    }

    /// A free size word at `at` that is not the end of a range like `S-XL`.
    fn condition_size_at(&self, clause: &[Token], consumed: &[bool], at: usize) -> bool {
        let Some(token) = clause.get(at).filter(|_| !consumed[at]) else {
            return false;
        };
        let size = token
            .word()
            .is_some_and(|w| !token.is_suffix() && self.lexicon.sizes.is_size_like(w));
        size && !(at > 0 && self.links_range(&clause[at - 1]))
    }

    /// Whether the size at `at` starts a range (`S-XL`, `S to XL`, `S'den`).
    fn opens_range(&self, clause: &[Token], at: usize) -> bool {
        clause.get(at + 1).is_some_and(|t| self.links_range(t))
    }

    fn links_range(&self, token: &Token) -> bool {
        let vocab = self.lexicon.vocabulary();
        *token == Token::Minus
            || token.word().is_some_and(|w| {
                vocab.range_connectors.iter().any(|c| c == w)
                    || vocab.range_from.iter().any(|f| f == w)
            })
    }

    /// Start of an open-range phrase that ends exactly at `end`.
    fn open_range_ending_at(
        &self,
        clause: &[Token],
        consumed: &[bool],
        end: usize,
    ) -> Option<usize> {
        let phrases = &self.lexicon.vocabulary().open_range;
        (1..=end.min(3))
            .rev()
            .map(|len| end - len)
            .find(|&from| phrase_at(clause, consumed, from, phrases) == Some(end - from))
    }

    /// Length in tokens of the longest color phrase starting at `at`.
    fn color_starting_at(&self, clause: &[Token], consumed: &[bool], at: usize) -> Option<usize> {
        let run: Vec<String> = clause
            .iter()
            .zip(consumed)
            .skip(at)
            .take(4)
            .map_while(|(t, used)| if *used { None } else { t.word().map(str::to_owned) })
            .collect();
        self.lexicon.colors.match_at(&run, 0).map(|(_, len)| len)
    }

    /// Start of a color phrase that ends exactly at `end`.
    fn color_ending_at(&self, clause: &[Token], consumed: &[bool], end: usize) -> Option<usize> {
        (1..=end.min(4))
            .rev()
            .map(|len| end - len)
            .find(|&from| self.color_starting_at(clause, consumed, from) == Some(end - from))
    }

    fn is_currency(&self, token: &Token) -> bool {
        token
            .word()
            .is_some_and(|w| self.lexicon.vocabulary().is_currency(w))
    }

    fn is_direction(&self, token: &Token) -> bool {
        let vocab = self.lexicon.vocabulary();
        token.word().is_some_and(|w| {
            vocab.increase.iter().any(|k| k == w) || vocab.decrease.iter().any(|k| k == w)
        })
    }

    fn is_universal(&self, condition: &str) -> bool {
        self.lexicon.vocabulary().is_universal(&words(condition))
    }

    /// Join the meaningful words of a token run into a condition string.
    fn condition_words(&self, tokens: &[Token], also_skip: impl Fn(&str) -> bool) -> String {
        let vocab = self.lexicon.vocabulary();
        tokens
            .iter()
            .filter_map(Token::word)
            .filter(|w| {
                !(vocab.filler.iter().any(|f| f == w)
                    || vocab.price_keywords.iter().any(|k| k == w)
                    || vocab.increase.iter().any(|k| k == w)
                    || vocab.decrease.iter().any(|k| k == w)
                    || vocab.is_currency(w)
                    || also_skip(*w))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // -- Declarations ------------------------------------------------------

    fn declarations(&self, run: &[&Token], found: &mut Findings) {
        if !run.is_empty() {
            self.sizes_in(run, found);
            self.colors_in(run, found);
        }
    }

    fn sizes_in(&self, declared: &[&Token], found: &mut Findings) {
        let table = &self.lexicon.sizes;
        let vocab = self.lexicon.vocabulary();
        let mut i = 0;
        while i < declared.len() {
            let start = declared[i]
                .word()
                .filter(|w| !declared[i].is_suffix() && table.is_size_like(w));
            let Some(start) = start else {
                i += 1;
                continue;
            };
            let mut j = i + 1;
            let from = declared
                .get(j)
                .and_then(|t| t.word())
                .is_some_and(|w| vocab.range_from.iter().any(|f| f == w));
            if from {
                j += 1;
            }
            let connector = declared.get(j).is_some_and(|t| {
                **t == Token::Minus
                    || t.word().is_some_and(|w| vocab.range_connectors.iter().any(|c| c == w))
            });
            if connector {
                j += 1;
            }
            let end = declared
                .get(j)
                .filter(|t| !t.is_suffix())
                .and_then(|t| t.word())
                .filter(|w| table.is_size_like(w));
            match end {
                Some(end) if from || connector => {
                    let range = table.range(start, end).unwrap_or_else(|err| {
                        tracing::warn!("size range {start}..{end} falling back to all sizes: {err}");
                        table.tokens().to_vec()
                    });
                    found.ranges.push(range);
                    i = j + 1;
                }
                _ => {
                    if let Some(token) = table.token(start) {
                        found.sizes.push(token.to_owned());
                    }
                    i += 1;
                }
            }
        }
    }

    fn colors_in(&self, declared: &[&Token], found: &mut Findings) {
        let words: Vec<String> = declared
            .iter()
            .filter_map(|t| t.word())
            .map(str::to_owned)
            .collect();
        let raws: Vec<&str> = declared
            .iter()
            .filter_map(|t| match t {
                Token::Word { raw, .. } => Some(raw.as_str()),
                _ => None,
            })
            .collect();
        let mut i = 0;
        while i < words.len() {
            match self.lexicon.colors.match_at(&words, i) {
                Some((entry, len)) => {
                    let label = raws[i..i + len]
                        .iter()
                        .map(|w| title_case(w))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let placeholder = self.lexicon.vocabulary().is_placeholder_color(&label);
                    if !placeholder && !found.colors.iter().any(|(e, _)| *e == entry) {
                        found.colors.push((entry, label));
                    }
                    i += len;
                }
                None => i += 1,
            }
        }
    }

    fn assemble(&self, found: Findings) -> RuleSet {
        let table = &self.lexicon.sizes;
        let mut sizes: Vec<String> = if found.ranges.is_empty() {
            found.sizes
        } else {
            found.ranges.into_iter().flatten().collect()
        };
        sizes.sort_by_key(|s| table.ordinal_or_last(s));
        sizes.dedup();

        let single = self.mode == FallbackMode::SingleRule;
        let keep = |n: usize| if single { n.min(1) } else { n };

        let mut builder = RuleSetBuilder::new()
            .sizes(sizes)
            .colors(found.colors.into_iter().map(|(_, label)| label));
        if let Some(price) = found.base_price {
            builder = builder.base_price(price);
        }
        if let Some(price) = found.compare_at_price {
            builder = builder.compare_at_price(price);
        }
        if let Some(stock) = found.default_stock {
            builder = builder.default_stock(stock);
        }
        let price_rules = keep(found.price_rules.len());
        for (condition, adjustment) in found.price_rules.into_iter().take(price_rules) {
            builder = builder.price_rule(condition, adjustment);
        }
        let compare_rules = keep(found.compare_rules.len());
        for (condition, value) in found.compare_rules.into_iter().take(compare_rules) {
            builder = builder.compare_rule(condition, value);
        }
        let stock_rules = keep(found.stock_rules.len());
        for (condition, quantity) in found.stock_rules.into_iter().take(stock_rules) {
            builder = builder.stock_rule(condition, quantity);
        }
        let rule_set = builder.build();
        tracing::debug!(
            sizes = ?rule_set.sizes(),
            colors = ?rule_set.colors(),
            price_rules = rule_set.price_rules().len(),
            stock_rules = rule_set.stock_rules().len(),
            "deterministic scan"
        );
        rule_set
    }
}

fn mark(consumed: &mut [bool], span: Range<usize>) {
    consumed[span].iter_mut().for_each(|c| *c = true);
}

fn is_joiner(word: &str) -> bool {
    JOINERS.contains(&word)
}

/// Token length of the longest phrase in `phrases` starting at `at`, over
/// unclaimed words only.
fn phrase_at(
    clause: &[Token],
    consumed: &[bool],
    at: usize,
    phrases: &[String],
) -> Option<usize> {
    phrases
        .iter()
        .map(|phrase| words(phrase))
        .filter(|parts| {
            !parts.is_empty()
                && at + parts.len() <= clause.len()
                && parts.iter().enumerate().all(|(k, part)| {
                    !consumed[at + k] && clause[at + k].word() == Some(part.as_str())
                })
        })
        .map(|parts| parts.len())
        .max()
}

#[async_trait]
impl PromptParser for DeterministicParser {
    async fn parse(&self, prompt: &str) -> Result<RuleSet, ParseFailure> {
        Ok(self.scan(prompt))
    }
}
