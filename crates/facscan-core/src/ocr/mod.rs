//! OCR backends and the image preprocessing that feeds them.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::{load_image, otsu_threshold, ImagePreprocessor};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Vertical bucket (pixels) within which boxes count as one text row.
const ROW_HEIGHT: f32 = 20.0;

/// Anything that turns a page image into plain text.
///
/// Implementations return lines in reading order separated by `\n`; the
/// analyzer relies on line structure to find the table and footer.
pub trait OcrBackend {
    /// Short backend name for logs and reports.
    fn name(&self) -> &str;

    /// Recognize all text on `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<B: OcrBackend + ?Sized> OcrBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right) and rebuild
/// the page text: boxes sharing a row are joined with a space, rows with `\n`.
pub fn reading_order_text(boxes: &mut [TextBox]) -> String {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = row_of(ay);
        let row_b = row_of(by);

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    let mut text = String::new();
    let mut current_row = None;
    for b in boxes.iter() {
        let row = row_of(b.rect().1);
        match current_row {
            Some(r) if r == row => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        text.push_str(&b.text);
        current_row = Some(row);
    }
    text
}

fn row_of(top: f32) -> i32 {
    (top / ROW_HEIGHT) as i32
}
