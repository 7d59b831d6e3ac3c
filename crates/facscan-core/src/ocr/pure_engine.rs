//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{reading_order_text, OcrBackend, TextBox};

/// OCR engine backed by `pure-onnx-ocr` (no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Load the detection model, recognition model and dictionary named by
    /// `config` from `config.model_dir`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Self::from_dir(&config.model_dir, config)
    }

    /// Load models from `model_dir`, using file names from `config`.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&config.detection_model);
        let rec_path = model_dir.join(config.recognition_model());
        let dict_path = model_dir.join(config.dictionary());

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine from {} (language {})",
            model_dir.display(),
            config.language
        );

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }

    /// Recognize text boxes on `image`, unsorted.
    pub fn detect_boxes(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Backend(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        Ok(results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: clean_unknown(&r.text, self.keep_unk),
                confidence: r.confidence,
            })
            .collect())
    }
}

impl OcrBackend for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let mut boxes = self.detect_boxes(image)?;
        let text = reading_order_text(&mut boxes);

        info!(
            "OCR complete: {} text boxes on {}x{} image in {}ms",
            boxes.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Blank out `[UNK]` tokens unless asked to keep them.
fn clean_unknown(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace("[UNK]", " ")
    }
}

/// Convert a `Polygon<f64>` to the `[f32; 8]` quadrilateral used by [`TextBox`].
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_unknown() {
        assert_eq!(clean_unknown("TOTAL[UNK]12,10", false), "TOTAL 12,10");
        assert_eq!(clean_unknown("TOTAL[UNK]12,10", true), "TOTAL[UNK]12,10");
    }

    #[test]
    fn test_missing_models() {
        let config = OcrConfig {
            model_dir: "does/not/exist".into(),
            ..OcrConfig::default()
        };
        let err = PureOcrEngine::from_config(&config).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }
}
