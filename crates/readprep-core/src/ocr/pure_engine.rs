//! OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{OcrResult, PageReader, TextBox};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the configured model files.
    pub fn from_config(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = models.model_dir.join(&models.detection_model);
        let rec_path = models.model_dir.join(&models.recognition_model);
        let dict_path = models.model_dir.join(&models.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded OCR engine from {}", models.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Recognize an image, returning boxes in reading order.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let regions = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = regions
            .iter()
            .map(|region| TextBox {
                bbox: polygon_to_bbox(&region.bounding_box),
                text: self.clean(&region.text),
                confidence: region.confidence,
            })
            .filter(|b| !b.text.trim().is_empty())
            .collect();

        debug!(
            "OCR on {}x{} image: {} text boxes in {}ms",
            width,
            height,
            boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(OcrResult::from_boxes(
            boxes,
            (width, height),
            self.config.row_tolerance,
        ))
    }

    fn clean(&self, text: &str) -> String {
        if self.config.keep_unk {
            text.to_string()
        } else {
            text.replace("[UNK]", " ")
        }
    }
}

impl PageReader for PureOcrEngine {
    fn read_page(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.process(image)?.text)
    }
}

/// First four exterior points of a polygon as `[x1, y1, .., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
