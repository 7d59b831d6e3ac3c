//! Rule-based extractors for OCR'd invoice text.

pub mod amounts;
pub mod footer;
pub mod line_items;
pub mod patterns;
pub mod reconcile;
pub mod regions;

pub use amounts::{normalize_amount, AmountExtractor};
pub use footer::{extract_footer, find_anchored_amount, find_tax_rate, FooterFields};
pub use line_items::{dedup_adjacent, extract_unit_prices};
pub use reconcile::reconcile;
pub use regions::Regions;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the text it was read from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
