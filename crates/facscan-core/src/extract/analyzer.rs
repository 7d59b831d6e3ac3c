//! Region-aware invoice analyzer turning OCR text into an [`OcrResult`].

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::result::OcrResult;

use super::rules::{extract_footer, extract_unit_prices, reconcile, Regions};

/// Invoice analyzer: regions, unit prices, footer fields, reconciliation.
///
/// Holds only configuration, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct InvoiceAnalyzer {
    /// Case-sensitive substrings marking item rows.
    item_keywords: Vec<String>,
}

impl InvoiceAnalyzer {
    /// Create an analyzer with the default item keywords.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an analyzer from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            item_keywords: config.item_keywords.clone(),
        }
    }

    /// Replace the item keywords.
    pub fn with_item_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn item_keywords(&self) -> &[String] {
        &self.item_keywords
    }

    /// Analyze one document's OCR text.
    ///
    /// Never fails: missing anchors or amounts show up as absent fields.
    pub fn analyze(&self, file: &str, text: &str) -> OcrResult {
        let regions = Regions::locate(text);

        info!(
            "Analyzing {}: {} lines (table from {}, footer from {})",
            file,
            regions.lines().len(),
            regions.table_start(),
            regions.footer_start()
        );

        let numbers = extract_unit_prices(regions.table_lines(), &self.item_keywords[..]);
        let footer = reconcile(extract_footer(regions.footer_lines(), regions.lines()));

        let mut result = OcrResult::empty(file, text).with_numbers(numbers);
        result.subtotal_line = footer.subtotal;
        result.iva_line = footer.tax;
        result.total_line = footer.total;

        debug!(
            "Analyzed {}: {} unit prices, subtotal={:?} iva={:?} total={:?}",
            file,
            result.numbers.len(),
            result.subtotal_line,
            result.iva_line,
            result.total_line
        );

        result
    }
}

impl Default for InvoiceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze `text` with the default configuration.
pub fn analyze_text(file: &str, text: &str) -> OcrResult {
    InvoiceAnalyzer::new().analyze(file, text)
}
