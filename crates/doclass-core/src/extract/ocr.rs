//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{OcrEngine, Result};
use crate::error::ExtractionError;

/// Vertical distance within which two text regions count as one line.
const LINE_TOLERANCE: f64 = 20.0;

/// PaddleOCR detection + recognition models loaded from a directory.
///
/// The directory must contain `det.onnx`, `latin_rec.onnx` and
/// `latin_dict.txt`.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrEngine {
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| ExtractionError::Ocr(format!("failed to load models: {e}")))?;

        info!("Loaded OCR models from {}", model_dir.display());
        Ok(Self { engine })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?;

        // Reading order: rows top to bottom, then left to right.
        let mut regions: Vec<((i64, f64), String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                (((y / LINE_TOLERANCE) as i64, x), r.text.replace("[UNK]", " "))
            })
            .collect();
        regions.sort_by(|(a, _), (b, _)| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        debug!(
            "OCR found {} regions in {}x{} image in {}ms",
            regions.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(regions
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
