//! Invoice field extraction from OCR text.

mod analyzer;
pub mod rules;

pub use analyzer::{analyze_text, InvoiceAnalyzer};
pub use rules::{normalize_amount, FooterFields, Regions};
