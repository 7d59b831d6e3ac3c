//! Configuration structures for the scanning pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ScanError};

/// Main configuration for the facscan pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Image preprocessing configuration.
    pub preprocess: PreprocessConfig,

    /// OCR backend configuration.
    pub ocr: OcrConfig,

    /// Input/output locations.
    pub io: IoConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Substrings (case-sensitive) that mark a line as an item row.
    pub item_keywords: Vec<String>,

    /// Tolerance for the `total = subtotal + tax` report check.
    pub math_tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            item_keywords: vec!["Curso".to_string(), "Dron".to_string(), "Casco".to_string()],
            math_tolerance: Decimal::new(1, 2),
        }
    }
}

/// Image preprocessing applied before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Convert to grayscale.
    pub grayscale: bool,

    /// Otsu binarization (grayscale images only).
    pub binarize: bool,

    /// Light Gaussian blur before thresholding.
    pub blur: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grayscale: true,
            binarize: true,
            blur: false,
        }
    }
}

/// OCR backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Language hint; selects `<language>_rec.onnx` and `<language>_dict.txt`.
    pub language: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            language: "latin".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Recognition model file name for the configured language.
    pub fn recognition_model(&self) -> String {
        format!("{}_rec.onnx", self.language)
    }

    /// Character dictionary file name for the configured language.
    pub fn dictionary(&self) -> String {
        format!("{}_dict.txt", self.language)
    }
}

/// Input/output locations used by batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Directory scanned for invoice images.
    pub input_dir: PathBuf,

    /// Directory receiving reports.
    pub output_dir: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/input"),
            output_dir: PathBuf::from("data/output"),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ScanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `FACSCAN_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `FACSCAN_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FACSCAN_INPUT_DIR") {
            self.io.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FACSCAN_OUTPUT_DIR") {
            self.io.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FACSCAN_MODEL_DIR") {
            self.ocr.model_dir = PathBuf::from(dir);
        }

        let flag = |key: &str, current: bool| lookup(key).map_or(current, |v| parse_flag(&v));
        self.preprocess.grayscale = flag("FACSCAN_GRAYSCALE", self.preprocess.grayscale);
        self.preprocess.binarize = flag("FACSCAN_BINARIZE", self.preprocess.binarize);
        self.preprocess.blur = flag("FACSCAN_BLUR", self.preprocess.blur);

        debug!("Configuration after environment overrides: {:?}", self);
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}
