//! WASM bindings for invoice OCR field extraction.
//!
//! OCR runs in the browser (or Node.js); these bindings turn its output into
//! unit prices and reconciled footer totals.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use facscan_core::extract::InvoiceAnalyzer;
use facscan_core::ocr::{reading_order_text, TextBox};
use facscan_core::OcrResult;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract unit prices and footer totals from OCR text using the default
/// item keywords.
#[wasm_bindgen]
pub fn analyze_text(file: &str, text: &str) -> Result<JsValue, JsValue> {
    to_js(&facscan_core::analyze_text(file, text))
}

/// Normalize an OCR'd money token (e.g. "1.234,56" or "20.666").
#[wasm_bindgen]
pub fn normalize_amount(token: &str) -> Option<f64> {
    facscan_core::normalize_amount(token)
        .ok()
        .and_then(|d| d.to_f64())
}

/// Invoice analyzer class for browser use.
#[wasm_bindgen]
pub struct Analyzer {
    inner: InvoiceAnalyzer,
}

#[wasm_bindgen]
impl Analyzer {
    /// Create an analyzer with the default item keywords.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: InvoiceAnalyzer::new(),
        }
    }

    /// Replace the item keywords; non-string entries are ignored.
    #[wasm_bindgen]
    pub fn set_item_keywords(&mut self, keywords: js_sys::Array) {
        let keywords: Vec<String> = keywords.iter().filter_map(|k| k.as_string()).collect();
        self.inner = self.inner.clone().with_item_keywords(keywords);
    }

    /// Current item keywords.
    #[wasm_bindgen]
    pub fn item_keywords(&self) -> js_sys::Array {
        self.inner
            .item_keywords()
            .iter()
            .map(|k| JsValue::from_str(k))
            .collect()
    }

    /// Analyze OCR text.
    #[wasm_bindgen]
    pub fn analyze(&self, file: &str, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.analyze(file, text))
    }

    /// Analyze OCR text and check `total = subtotal + tax` within `tolerance`.
    #[wasm_bindgen]
    pub fn analyze_with_check(
        &self,
        file: &str,
        text: &str,
        tolerance: f64,
    ) -> Result<JsValue, JsValue> {
        let tolerance = Decimal::from_f64(tolerance)
            .ok_or_else(|| JsValue::from_str("tolerance must be a finite number"))?;

        #[derive(serde::Serialize)]
        struct CheckedResult {
            result: OcrResult,
            check_math_ok: Option<bool>,
            check_math_diff: Option<Decimal>,
        }

        let result = self.inner.analyze(file, text);
        let check = result.math_check(tolerance);

        to_js(&CheckedResult {
            result,
            check_math_ok: check.ok,
            check_math_diff: check.diff,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Text boxes from browser-side OCR, assembled into page text.
#[wasm_bindgen]
pub struct OcrPage {
    file: String,
    boxes: Vec<TextBox>,
}

#[wasm_bindgen]
impl OcrPage {
    #[wasm_bindgen(constructor)]
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            boxes: Vec::new(),
        }
    }

    /// Add a recognized text box (quadrilateral corners in pixels).
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes.push(TextBox {
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            text: text.to_string(),
            confidence,
        });
    }

    /// Page text in reading order.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        let mut boxes = self.boxes.clone();
        reading_order_text(&mut boxes)
    }

    /// Analyze the page with `analyzer`.
    #[wasm_bindgen]
    pub fn analyze(&self, analyzer: &Analyzer) -> Result<JsValue, JsValue> {
        analyzer.analyze(&self.file, &self.get_text())
    }
}
