//! Subtotal, tax and total extraction from the footer region.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::{recover_digit_run, AmountExtractor};
use super::patterns::{PERCENT_PATTERN, SUBTOTAL_ANCHOR, TAX_ANCHOR, TOTAL_ANCHOR};
use super::FieldExtractor;

/// How many lines below an anchor may carry its amount (anchor line included).
const ANCHOR_WINDOW: usize = 3;

/// Raw footer figures, before reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FooterFields {
    pub subtotal: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
    /// Tax rate in percent, e.g. `21`.
    pub tax_rate: Option<Decimal>,
}

/// Extract subtotal, tax, total and the tax rate hint.
///
/// `all_lines` is only consulted for the rate hint when the footer is empty.
pub fn extract_footer(footer_lines: &[&str], all_lines: &[&str]) -> FooterFields {
    let rate_lines = if footer_lines.is_empty() {
        all_lines
    } else {
        footer_lines
    };

    let fields = FooterFields {
        subtotal: find_anchored_amount(footer_lines, &SUBTOTAL_ANCHOR),
        tax: find_anchored_amount(footer_lines, &TAX_ANCHOR),
        total: find_anchored_amount(footer_lines, &TOTAL_ANCHOR),
        tax_rate: find_tax_rate(rate_lines),
    };

    debug!(
        "Footer raw fields: subtotal={:?} tax={:?} total={:?} rate={:?}",
        fields.subtotal, fields.tax, fields.total, fields.tax_rate
    );

    fields
}

/// Bottom-up search for the amount attached to an anchor.
///
/// For each anchor line, from the last one upwards, tries in order: an amount
/// on the anchor line, on the next line, on the line after that, then a bare
/// digit run on the anchor line. The first anchor line yielding anything wins.
pub fn find_anchored_amount(lines: &[&str], anchor: &Regex) -> Option<Decimal> {
    let extractor = AmountExtractor::new();

    lines
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, line)| anchor.is_match(line))
        .find_map(|(i, line)| {
            lines[i..]
                .iter()
                .take(ANCHOR_WINDOW)
                .find_map(|candidate| extractor.extract(candidate))
                .map(|m| {
                    debug!("Anchor {:?} matched amount {:?}", line, m.source);
                    m.value
                })
                .or_else(|| recover_digit_run(line))
        })
}

/// First percentage found scanning `lines` bottom-up; decimals are ignored.
pub fn find_tax_rate(lines: &[&str]) -> Option<Decimal> {
    lines.iter().rev().find_map(|line| {
        let caps = PERCENT_PATTERN.captures(line)?;
        caps[1].parse::<u32>().ok().map(Decimal::from)
    })
}
