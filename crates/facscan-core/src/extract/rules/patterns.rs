//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Digits are ASCII-only throughout: callers slice matches by byte offset.

    // Money amounts: optional euro glyph, optional thousands groups, 2 or 3
    // decimals. Word boundaries around the match are checked by the caller.
    pub static ref MONEY_PATTERN: Regex = Regex::new(
        r"(?:€\s*)?(?:[0-9]{1,3}(?:[.,][0-9]{3})*|[0-9]+)[.,][0-9]{2,3}(?:\s*€)?"
    ).unwrap();

    // Token shape accepted by the 3rd-decimal truncation rule.
    pub static ref TRAILING_DECIMALS: Regex = Regex::new(
        r"^(.+?)[.,]([0-9]{2,3})$"
    ).unwrap();

    // Bare digit run used when OCR dropped the decimal separator.
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"\b([0-9]{3,6})\b"
    ).unwrap();

    // Tax rate hint (21%, 21,0 %, 10.5%)
    pub static ref PERCENT_PATTERN: Regex = Regex::new(
        r"\b([0-9]{1,2})(?:[.,][0-9]+)?\s*%"
    ).unwrap();

    // Region anchors
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)\bconcepto\b"
    ).unwrap();

    // Footer field anchors
    pub static ref SUBTOTAL_ANCHOR: Regex = Regex::new(
        r"(?i)\b(?:base\s+imponible|subtotal)\b"
    ).unwrap();

    // IVA as misread by OCR: IVA, LVA, 1VA, !VA, |VA, (VA
    pub static ref TAX_ANCHOR: Regex = Regex::new(
        r"(?i)(?:^|[^\w])[il1!|(]?va\b"
    ).unwrap();

    pub static ref TOTAL_ANCHOR: Regex = Regex::new(
        r"(?i)\btotal\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_anchor_variants() {
        for line in ["IVA 21%", "iva: 10,00", "LVA 21,49", "1VA 21,49", "(VA 3,00", "!VA 1,00", "|VA 2,00"] {
            assert!(TAX_ANCHOR.is_match(line), "expected tax anchor in {:?}", line);
        }
    }

    #[test]
    fn test_tax_anchor_ignores_words_ending_in_va() {
        assert!(!TAX_ANCHOR.is_match("Tarifa nueva"));
        assert!(!TAX_ANCHOR.is_match("Cuota activa 12,00"));
    }

    #[test]
    fn test_total_anchor_is_whole_word() {
        assert!(TOTAL_ANCHOR.is_match("TOTAL 302.43"));
        assert!(TOTAL_ANCHOR.is_match("Importe total: 10,00"));
        assert!(!TOTAL_ANCHOR.is_match("SUBTOTAL 100,00"));
    }

    #[test]
    fn test_subtotal_anchor() {
        assert!(SUBTOTAL_ANCHOR.is_match("BASE  IMPONIBLE 249.94"));
        assert!(SUBTOTAL_ANCHOR.is_match("Subtotal: 10,00"));
        assert!(!SUBTOTAL_ANCHOR.is_match("Base 10,00"));
    }

    #[test]
    fn test_percent_pattern() {
        assert_eq!(&PERCENT_PATTERN.captures("IVA 21% 52.49").unwrap()[1], "21");
        assert_eq!(&PERCENT_PATTERN.captures("IVA (21,0 %)").unwrap()[1], "21");
        assert!(PERCENT_PATTERN.captures("IVA 121%").is_none());
    }
}
