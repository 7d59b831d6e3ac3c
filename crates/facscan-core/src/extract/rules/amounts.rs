//! Amount normalization and extraction for OCR'd invoices.
//!
//! OCR output mixes `1.234,56` and `1,234.56` styles, drops or duplicates
//! separators and sometimes adds a spurious third decimal. Everything that
//! turns a money-like token into a [`Decimal`] goes through
//! [`normalize_amount`].

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use crate::error::ParseError;

use super::patterns::{DIGIT_RUN, MONEY_PATTERN, TRAILING_DECIMALS};
use super::{ExtractionMatch, FieldExtractor};

/// Glyphs stripped from a token before parsing.
const CURRENCY_GLYPHS: [char; 3] = ['€', '$', '£'];

/// Money amount extractor (2 or 3 trailing decimals).
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        find_money(text)
            .into_iter()
            .filter_map(|(start, token)| match normalize_amount(token) {
                Ok(value) => Some(
                    ExtractionMatch::new(value, token).with_position(start, start + token.len()),
                ),
                Err(e) => {
                    trace!("skipping money candidate {:?}: {}", token, e);
                    None
                }
            })
            .collect()
    }
}

/// Normalize a money-like token into a decimal value.
///
/// Rules, in order:
/// 1. currency glyphs and whitespace are removed;
/// 2. a token ending in a separator plus exactly three digits keeps only the
///    first two of them (`20.666` is read as `20.66`, truncated, not rounded);
/// 3. with both `.` and `,` present the later one is the decimal separator;
/// 4. with a single separator kind, its last occurrence is the decimal
///    separator and earlier ones are thousands separators.
pub fn normalize_amount(token: &str) -> Result<Decimal, ParseError> {
    let mut cleaned: String = token
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_GLYPHS.contains(c))
        .collect();

    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(caps) = TRAILING_DECIMALS.captures(&cleaned) {
        let decimals = &caps[2];
        if decimals.len() == 3 {
            cleaned = format!("{}.{}", &caps[1], &decimals[..2]);
        }
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => last_separator_as_decimal(&cleaned, ','),
        (None, Some(_)) => last_separator_as_decimal(&cleaned, '.'),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).map_err(|_| ParseError::InvalidAmount(token.to_string()))
}

fn last_separator_as_decimal(s: &str, sep: char) -> String {
    match s.rfind(sep) {
        Some(pos) => {
            let (integer, fraction) = s.split_at(pos);
            format!("{}.{}", integer.replace(sep, ""), &fraction[sep.len_utf8()..])
        }
        None => s.to_string(),
    }
}

/// Find money-pattern matches that are not glued to letters or digits.
///
/// Returns each token with its byte offset in `text`.
pub fn find_money(text: &str) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let Some(m) = MONEY_PATTERN.find_at(text, start) else {
            break;
        };

        match standalone_end(text, m.start(), m.end()) {
            Some(end) => {
                found.push((m.start(), &text[m.start()..end]));
                start = end;
            }
            None => {
                // retry one character further, a shorter match may still stand alone
                start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    found
}

/// End offset of a standalone match, dropping a trailing euro glyph if only
/// the shorter token stands alone (`12,50 €x` yields `12,50`).
fn standalone_end(text: &str, start: usize, end: usize) -> Option<usize> {
    if is_standalone(text, start, end) {
        return Some(end);
    }
    let trimmed = text[start..end].strip_suffix('€')?.trim_end();
    let end = start + trimmed.len();
    is_standalone(text, start, end).then_some(end)
}

fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First parsable amount in a line.
pub fn first_amount(line: &str) -> Option<Decimal> {
    AmountExtractor::new().extract(line).map(|m| m.value)
}

/// Recover an amount whose decimal separator OCR dropped.
///
/// Looks for a bare 3-6 digit run (digit groups split by whitespace are joined
/// first) and places the decimal point two digits from the end: `1234` → `12.34`.
pub fn recover_digit_run(line: &str) -> Option<Decimal> {
    let joined = join_digit_groups(line);
    let caps = DIGIT_RUN.captures(&joined)?;
    let raw = &caps[1];
    let (integer, fraction) = raw.split_at(raw.len() - 2);
    Decimal::from_str(&format!("{}.{}", integer, fraction)).ok()
}

fn join_digit_groups(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut joined = String::with_capacity(line.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            let prev_digit = joined.chars().next_back().is_some_and(|p| p.is_ascii_digit());
            let next_digit = chars[i + 1..]
                .iter()
                .find(|n| !n.is_whitespace())
                .is_some_and(|n| n.is_ascii_digit());
            if prev_digit && next_digit {
                continue;
            }
        }
        joined.push(c);
    }

    joined
}

/// Round to cents.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
