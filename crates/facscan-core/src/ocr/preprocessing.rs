//! Image preprocessing for OCR.

use std::path::Path;

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::error::{OcrError, Result};
use crate::models::config::PreprocessConfig;

/// Gaussian sigma matching a 3x3 kernel.
const BLUR_SIGMA: f32 = 0.8;

/// Image preprocessor for the OCR pipeline.
///
/// Steps run in a fixed order: grayscale, blur, Otsu binarization. Binarization
/// only applies to single-channel images, so it is a no-op when grayscale
/// conversion is disabled and the input is in color.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Prepare `image` for recognition.
    pub fn process(&self, image: &DynamicImage) -> std::result::Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        let mut out = if self.config.grayscale {
            DynamicImage::ImageLuma8(image.to_luma8())
        } else {
            image.clone()
        };

        if self.config.blur {
            out = out.blur(BLUR_SIGMA);
        }

        if self.config.binarize {
            if let DynamicImage::ImageLuma8(gray) = &out {
                let threshold = otsu_threshold(gray);
                debug!("Otsu threshold for {}x{} image: {}", width, height, threshold);
                out = DynamicImage::ImageLuma8(binarize(gray, threshold));
            }
        }

        Ok(out)
    }
}

/// Global threshold maximizing between-class variance of the histogram.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0f64;
    let mut best_variance = 0f64;
    let mut threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight as f64;

        let variance = background_weight as f64
            * foreground_weight as f64
            * (background_mean - foreground_mean).powi(2);
        if variance > best_variance {
            best_variance = variance;
            threshold = level as u8;
        }
    }

    threshold
}

/// Pixels above `threshold` become white, the rest black.
fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let output = if pixel[0] > threshold { 255 } else { 0 };
        result.put_pixel(x, y, Luma([output]));
    }

    result
}

/// Load an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)?;
    debug!(
        "Loaded {}: {}x{}",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Left half dark, right half light.
    fn two_tone(dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(8, 4, |x, _| if x < 4 { Luma([dark]) } else { Luma([light]) })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let image = two_tone(10, 200);
        let threshold = otsu_threshold(&image);
        assert!((10..200).contains(&threshold));
    }

    #[test]
    fn test_otsu_uniform_image() {
        let image = GrayImage::from_pixel(4, 4, Luma([128]));
        assert_eq!(otsu_threshold(&image), 0);
    }

    #[test]
    fn test_default_pipeline_binarizes() {
        let preprocessor = ImagePreprocessor::default();
        let out = preprocessor
            .process(&DynamicImage::ImageLuma8(two_tone(30, 220)))
            .unwrap();

        let gray = out.as_luma8().unwrap();
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(7, 0)[0], 255);
    }

    #[test]
    fn test_color_input_is_converted_to_grayscale() {
        let color = RgbImage::from_pixel(3, 3, Rgb([200, 10, 10]));
        let out = ImagePreprocessor::default()
            .process(&DynamicImage::ImageRgb8(color))
            .unwrap();
        assert!(out.as_luma8().is_some());
    }

    #[test]
    fn test_binarize_skipped_for_color() {
        let config = PreprocessConfig {
            grayscale: false,
            binarize: true,
            blur: false,
        };
        let color = RgbImage::from_pixel(3, 3, Rgb([200, 10, 10]));
        let out = ImagePreprocessor::new(config)
            .process(&DynamicImage::ImageRgb8(color.clone()))
            .unwrap();
        assert_eq!(out.as_rgb8(), Some(&color));
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let config = PreprocessConfig {
            grayscale: true,
            binarize: false,
            blur: true,
        };
        let out = ImagePreprocessor::new(config)
            .process(&DynamicImage::ImageLuma8(two_tone(0, 255)))
            .unwrap();
        assert_eq!(out.dimensions(), (8, 4));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let err = ImagePreprocessor::default().process(&empty).unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn test_load_missing_image() {
        assert!(load_image(Path::new("does/not/exist.png")).is_err());
    }
}
