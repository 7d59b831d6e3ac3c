//! Unit price extraction from the line-item region.

use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::AmountExtractor;
use super::FieldExtractor;

/// Upper bound (exclusive) for a plausible unit price.
pub const MAX_UNIT_PRICE: Decimal = Decimal::ONE_THOUSAND;

/// Two prices closer than this are the same price.
pub const DEDUP_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Extract unit prices from item rows.
///
/// A row is any line containing one of `keywords` (case-sensitive substring).
/// Its first amount is the unit price; rows list the price before
/// quantity-derived amounts. Prices outside (0, 1000) are dropped and
/// consecutive repeats collapsed.
pub fn extract_unit_prices<S: AsRef<str>>(lines: &[&str], keywords: &[S]) -> Vec<Decimal> {
    let extractor = AmountExtractor::new();

    let prices: Vec<Decimal> = lines
        .iter()
        .filter(|line| keywords.iter().any(|k| line.contains(k.as_ref())))
        .filter_map(|line| {
            let price = extractor.extract(line)?.value;
            if is_plausible_unit_price(price) {
                Some(price)
            } else {
                debug!("discarding implausible unit price {} in {:?}", price, line);
                None
            }
        })
        .collect();

    dedup_adjacent(prices)
}

fn is_plausible_unit_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price < MAX_UNIT_PRICE
}

/// Collapse runs of near-equal values, keeping the first of each run.
///
/// OCR occasionally emits the same row twice; only adjacent repeats are
/// treated as artefacts.
pub fn dedup_adjacent(values: Vec<Decimal>) -> Vec<Decimal> {
    let mut deduped: Vec<Decimal> = Vec::with_capacity(values.len());
    for value in values {
        match deduped.last() {
            Some(last) if last.checked_sub(value).is_some_and(|d| d.abs() <= DEDUP_TOLERANCE) => {}
            _ => deduped.push(value),
        }
    }
    deduped
}
