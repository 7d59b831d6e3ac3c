//! Data models: configuration and the extraction result record.

pub mod config;
pub mod result;

pub use config::{ExtractionConfig, IoConfig, OcrConfig, PreprocessConfig, ScanConfig};
pub use result::{check_value, OcrResult, ValueCheck};
