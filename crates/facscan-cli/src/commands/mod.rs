//! Subcommand implementations and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use facscan_core::models::config::ScanConfig;
use facscan_core::PureOcrEngine;

/// Image extensions accepted as OCR input.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

/// Extension of pre-extracted OCR text.
pub const TEXT_EXTENSION: &str = "txt";

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facscan")
        .join("config.json")
}

/// Path named by `--config`, or the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration and apply `FACSCAN_*` environment overrides.
///
/// An explicit `--config` must exist; the default file is optional.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    let path = config_file(config_path);

    let mut config = if path.exists() {
        debug!("Loading configuration from {}", path.display());
        ScanConfig::from_file(&path)?
    } else if config_path.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        ScanConfig::default()
    };

    config.apply_env();
    Ok(config)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_image_file(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(path).as_str())
}

pub fn is_text_file(path: &Path) -> bool {
    extension(path) == TEXT_EXTENSION
}

/// Read pre-extracted OCR text, replacing invalid UTF-8.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load the OCR engine, optionally from a model directory other than the
/// configured one.
pub fn load_engine(config: &ScanConfig, model_dir: Option<&Path>) -> anyhow::Result<PureOcrEngine> {
    let mut ocr = config.ocr.clone();
    if let Some(dir) = model_dir {
        ocr.model_dir = dir.to_path_buf();
    }

    PureOcrEngine::from_config(&ocr).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models from {}: {}\n\n\
             Place {}, {} and {} there, or pass --model-dir.",
            ocr.model_dir.display(),
            e,
            ocr.detection_model,
            ocr.recognition_model(),
            ocr.dictionary()
        )
    })
}
