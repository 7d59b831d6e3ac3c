//! Arithmetic reconciliation of footer figures.
//!
//! OCR tends to garble one footer figure out of three. Given the rate hint and
//! `subtotal + tax = total`, the weakest figure is recomputed from the others.
//! Mismatches are repaired, never reported.

use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::round_cents;
use super::footer::FooterFields;

/// Maximum difference between a detected and a computed figure.
pub const RECONCILE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Repair tax and total from subtotal, rate hint and each other.
///
/// All present figures come back rounded to cents. A figure whose computation
/// would overflow [`Decimal`] is left as detected.
pub fn reconcile(fields: FooterFields) -> FooterFields {
    let FooterFields {
        subtotal,
        mut tax,
        mut total,
        tax_rate,
    } = fields;

    if let (Some(subtotal), Some(rate)) = (subtotal, tax_rate) {
        match subtotal
            .checked_mul(rate)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        {
            Some(computed) => tax = Some(replace_if_off(tax, round_cents(computed), "tax")),
            None => debug!("tax not derivable from {} at {}%", subtotal, rate),
        }
    }

    if let (Some(subtotal), Some(tax)) = (subtotal, tax) {
        match subtotal.checked_add(tax) {
            Some(computed) => total = Some(replace_if_off(total, round_cents(computed), "total")),
            None => debug!("total not derivable from {} + {}", subtotal, tax),
        }
    }

    FooterFields {
        subtotal: subtotal.map(round_cents),
        tax: tax.map(round_cents),
        total: total.map(round_cents),
        tax_rate,
    }
}

fn replace_if_off(detected: Option<Decimal>, computed: Decimal, field: &str) -> Decimal {
    match detected {
        Some(value) if within_tolerance(value, computed) => value,
        Some(value) => {
            debug!("Replacing {} {} with computed {}", field, value, computed);
            computed
        }
        None => {
            debug!("Deriving missing {} as {}", field, computed);
            computed
        }
    }
}

fn within_tolerance(value: Decimal, computed: Decimal) -> bool {
    value
        .checked_sub(computed)
        .is_some_and(|diff| diff.abs() <= RECONCILE_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fields(subtotal: Option<&str>, tax: Option<&str>, total: Option<&str>, rate: Option<&str>) -> FooterFields {
        FooterFields {
            subtotal: subtotal.map(dec),
            tax: tax.map(dec),
            total: total.map(dec),
            tax_rate: rate.map(dec),
        }
    }

    #[test]
    fn test_missing_tax_and_total_are_derived() {
        let result = reconcile(fields(Some("100.00"), None, None, Some("21")));

        assert_eq!(result.tax, Some(dec("21.00")));
        assert_eq!(result.total, Some(dec("121.00")));
    }

    #[test]
    fn test_total_within_tolerance_is_kept() {
        let result = reconcile(fields(Some("100.00"), Some("21.00"), Some("121.01"), None));
        assert_eq!(result.total, Some(dec("121.01")));
    }

    #[test]
    fn test_total_beyond_tolerance_is_replaced() {
        let result = reconcile(fields(Some("100.00"), Some("21.00"), Some("122.00"), None));
        assert_eq!(result.total, Some(dec("121.00")));
    }

    #[test]
    fn test_garbled_tax_is_replaced_from_rate() {
        let result = reconcile(fields(Some("249.94"), Some("2.49"), Some("302.43"), Some("21")));

        assert_eq!(result.tax, Some(dec("52.49")));
        assert_eq!(result.total, Some(dec("302.43")));
    }

    #[test]
    fn test_matching_tax_is_kept() {
        let result = reconcile(fields(Some("249.94"), Some("52.49"), Some("302.43"), Some("21")));

        assert_eq!(result.tax, Some(dec("52.49")));
        assert_eq!(result.total, Some(dec("302.43")));
    }

    #[test]
    fn test_without_subtotal_nothing_is_derived() {
        let result = reconcile(fields(None, Some("21.00"), None, Some("21")));

        assert_eq!(result.tax, Some(dec("21.00")));
        assert_eq!(result.total, None);
    }

    #[test]
    fn test_values_are_rounded_to_cents() {
        let result = reconcile(fields(None, None, Some("12.345"), None));
        assert_eq!(result.total, Some(dec("12.34")));
    }

    #[test]
    fn test_overflowing_tax_keeps_detected_figures() {
        let mut input = fields(None, Some("1.00"), None, Some("99"));
        input.subtotal = Some(Decimal::MAX);
        let result = reconcile(input);

        assert_eq!(result.subtotal, Some(Decimal::MAX));
        assert_eq!(result.tax, Some(dec("1.00")));
        assert_eq!(result.total, None);
    }

    #[test]
    fn test_overflowing_total_keeps_detected_figure() {
        let mut input = fields(None, None, Some("5.00"), None);
        input.subtotal = Some(Decimal::MAX);
        input.tax = Some(Decimal::MAX);
        let result = reconcile(input);

        assert_eq!(result.tax, Some(Decimal::MAX));
        assert_eq!(result.total, Some(dec("5.00")));
    }

    #[test]
    fn test_nothing_detected() {
        assert_eq!(reconcile(FooterFields::default()), FooterFields::default());
    }
}
