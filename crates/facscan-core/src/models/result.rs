//! Extraction result record and arithmetic checks over it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extract::rules::amounts::round_cents;

/// Monetary fields recovered from one document's OCR text.
///
/// Built once per document by the analyzer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Document identifier, passed through unchanged.
    pub file: String,

    /// OCR text exactly as received.
    pub text: String,

    /// Unit prices in order of appearance, consecutive repeats removed.
    pub numbers: Vec<Decimal>,

    /// Sum of `numbers`.
    pub sum: Decimal,

    /// Mean of `numbers`, absent when there are none.
    pub avg: Option<Decimal>,

    /// Invoice total.
    pub total_line: Option<Decimal>,

    /// Taxable base (subtotal).
    pub subtotal_line: Option<Decimal>,

    /// Tax (IVA) amount.
    pub iva_line: Option<Decimal>,
}

impl OcrResult {
    /// A result with no extracted fields, e.g. for a document with no text.
    pub fn empty(file: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            text: text.into(),
            numbers: Vec::new(),
            sum: Decimal::ZERO,
            avg: None,
            total_line: None,
            subtotal_line: None,
            iva_line: None,
        }
    }

    /// Set unit prices, deriving `sum` and `avg`.
    pub(crate) fn with_numbers(mut self, numbers: Vec<Decimal>) -> Self {
        self.sum = numbers.iter().copied().sum();
        self.avg = if numbers.is_empty() {
            None
        } else {
            Some(self.sum / Decimal::from(numbers.len()))
        };
        self.numbers = numbers;
        self
    }

    /// Whether `total_line ≈ subtotal_line + iva_line` within `tolerance`.
    ///
    /// The difference is rounded to cents. Unknown when any figure is absent
    /// or the arithmetic overflows.
    pub fn math_check(&self, tolerance: Decimal) -> ValueCheck {
        let (Some(total), Some(subtotal), Some(iva)) = (self.total_line, self.subtotal_line, self.iva_line) else {
            return ValueCheck::default();
        };
        match subtotal.checked_add(iva).and_then(|sum| total.checked_sub(sum)) {
            Some(diff) => ValueCheck::from_diff(round_cents(diff), tolerance),
            None => ValueCheck::default(),
        }
    }
}

/// Outcome of comparing an observed figure against an expected one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCheck {
    /// `None` when either side is missing.
    pub ok: Option<bool>,
    /// `observed - expected`.
    pub diff: Option<Decimal>,
}

impl ValueCheck {
    fn from_diff(diff: Decimal, tolerance: Decimal) -> Self {
        Self {
            ok: Some(diff.abs() <= tolerance),
            diff: Some(diff),
        }
    }
}

/// Compare an observed value with an expected one.
pub fn check_value(
    observed: Option<Decimal>,
    expected: Option<Decimal>,
    tolerance: Decimal,
) -> ValueCheck {
    match (observed, expected) {
        (Some(observed), Some(expected)) => observed
            .checked_sub(expected)
            .map(|diff| ValueCheck::from_diff(diff, tolerance))
            .unwrap_or_default(),
        _ => ValueCheck::default(),
    }
}
