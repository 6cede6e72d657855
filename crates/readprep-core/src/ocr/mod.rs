//! OCR fallback for scanned documents.

#[cfg(feature = "ocr")]
mod pure_engine;

#[cfg(feature = "ocr")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

/// Recognizes the text on a page image.
pub trait PageReader {
    /// Text on the page, one recognized line per output line.
    fn read_page(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// A recognized text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners as (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Top-left corner of the axis-aligned bounding rectangle.
    pub fn origin(&self) -> (f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];
        (
            xs.iter().copied().fold(f32::INFINITY, f32::min),
            ys.iter().copied().fold(f32::INFINITY, f32::min),
        )
    }
}

/// Result of OCR on a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Box texts joined with newlines.
    pub text: String,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result, ordering boxes top-to-bottom then left-to-right.
    ///
    /// Boxes whose tops fall in the same `row_tolerance` pixel band count as
    /// one row.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), row_tolerance: f32) -> Self {
        let band = row_tolerance.max(1.0);
        boxes.sort_by(|a, b| {
            let (ax, ay) = a.origin();
            let (bx, by) = b.origin();
            let row_a = (ay / band) as i32;
            let row_b = (by / band) as i32;
            row_a
                .cmp(&row_b)
                .then(ax.partial_cmp(&bx).unwrap_or(Ordering::Equal))
        });

        let text = boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes,
            text,
            image_size,
        }
    }
}

/// Load the configured OCR engine.
///
/// Returns `Ok(None)` when OCR is turned off or the model files are absent,
/// so callers can skip the fallback.
#[cfg(feature = "ocr")]
pub fn load_reader(
    ocr: &OcrConfig,
    models: &ModelConfig,
) -> Result<Option<Box<dyn PageReader>>, OcrError> {
    if !ocr.enabled {
        return Ok(None);
    }
    if !models.is_available() {
        tracing::warn!(
            "OCR models not found in {}, skipping OCR",
            models.model_dir.display()
        );
        return Ok(None);
    }
    let engine = PureOcrEngine::from_config(models, ocr.clone())?;
    Ok(Some(Box::new(engine)))
}

/// Load the configured OCR engine.
///
/// Built without the `ocr` feature, there is never an engine.
#[cfg(not(feature = "ocr"))]
pub fn load_reader(
    ocr: &OcrConfig,
    _models: &ModelConfig,
) -> Result<Option<Box<dyn PageReader>>, OcrError> {
    if ocr.enabled {
        tracing::warn!("{}", OcrError::Disabled);
    }
    Ok(None)
}
