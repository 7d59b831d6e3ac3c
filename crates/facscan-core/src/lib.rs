//! Core library for invoice OCR post-processing.
//!
//! This crate provides:
//! - Amount normalization for OCR'd money tokens (mixed separators, glyph noise)
//! - Region-aware extraction of unit prices and footer totals
//! - Arithmetic reconciliation of subtotal, tax and total
//! - Image preprocessing and a pluggable OCR backend

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{OcrError, ParseError, Result, ScanError};
pub use extract::{analyze_text, normalize_amount, InvoiceAnalyzer};
pub use models::{check_value, OcrResult, ScanConfig, ValueCheck};
pub use ocr::{ImagePreprocessor, OcrBackend, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::DocumentScanner;
