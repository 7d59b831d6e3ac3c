//! End-to-end document scanning: load, preprocess, recognize, analyze.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::extract::InvoiceAnalyzer;
use crate::models::config::ScanConfig;
use crate::models::result::OcrResult;
use crate::ocr::{load_image, ImagePreprocessor, OcrBackend};

/// Runs one document at a time through an OCR backend and the analyzer.
pub struct DocumentScanner<B> {
    backend: B,
    preprocessor: ImagePreprocessor,
    analyzer: InvoiceAnalyzer,
}

impl<B: OcrBackend> DocumentScanner<B> {
    pub fn new(backend: B, preprocessor: ImagePreprocessor, analyzer: InvoiceAnalyzer) -> Self {
        Self {
            backend,
            preprocessor,
            analyzer,
        }
    }

    /// Build a scanner whose preprocessing and extraction follow `config`.
    pub fn from_config(backend: B, config: &ScanConfig) -> Self {
        Self::new(
            backend,
            ImagePreprocessor::new(config.preprocess),
            InvoiceAnalyzer::from_config(&config.extraction),
        )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scan an image file. The result is keyed by the file name.
    pub fn scan_file(&self, path: &Path) -> Result<OcrResult> {
        let start = Instant::now();
        let file = file_name(path);

        let image = load_image(path)?;
        let processed = self.preprocessor.process(&image)?;
        let text = self.backend.recognize(&processed)?;
        debug!(
            "{} recognized {} characters in {}",
            self.backend.name(),
            text.len(),
            file
        );

        let result = self.analyzer.analyze(&file, &text);
        info!("Scanned {} in {:?}", file, start.elapsed());
        Ok(result)
    }

    /// Analyze text that was already recognized.
    pub fn scan_text(&self, file: &str, text: &str) -> OcrResult {
        self.analyzer.analyze(file, text)
    }
}

/// Final path component, or the whole path when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
