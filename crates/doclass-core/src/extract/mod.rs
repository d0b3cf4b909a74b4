//! Text extraction from uploaded documents.
//!
//! The extractor is keyed by file extension:
//! - `pdf`: native text layer, OCR of embedded page images when the text
//!   layer is too thin
//! - `png` / `jpg` / `jpeg`: OCR after binarisation
//! - `docx`: paragraph text
//! - `xlsx` / `csv`: tabular dump
//! - `txt`: the bytes as UTF-8

mod docx;
#[cfg(feature = "ocr")]
mod ocr;
mod pdf;
mod preprocess;
mod tabular;

use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use pdf::PdfDocument;
pub use preprocess::prepare_for_ocr;

use crate::error::ExtractionError;
use crate::models::ExtractionConfig;

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "txt", "xlsx", "docx", "csv"];

/// Recognises text in an image.
pub trait OcrEngine: Send + Sync {
    /// Recognised text in reading order, one line per text region.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Image,
    Docx,
    Xlsx,
    Csv,
    Text,
}

impl DocumentFormat {
    /// Format for an extension, ignoring case and a leading dot.
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = normalize_extension(ext);
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" | "jpg" | "jpeg" => Ok(Self::Image),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Text),
            _ => Err(ExtractionError::UnsupportedExtension(ext)),
        }
    }
}

/// Lowercased extension of `filename`: the text after the last dot, or
/// the whole name when it has none.
pub fn extension_of(filename: &str) -> String {
    let name = base_name(filename);
    normalize_extension(name.rsplit('.').next().unwrap_or(name))
}

/// Whether `filename` has an extension accepted for upload.
pub fn is_supported_extension(filename: &str) -> bool {
    base_name(filename).contains('.')
        && SUPPORTED_EXTENSIONS.contains(&extension_of(filename).as_str())
}

fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Turns file bytes into plain text.
#[derive(Clone)]
pub struct TextExtractor {
    min_pdf_text_chars: usize,
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("min_pdf_text_chars", &self.min_pdf_text_chars)
            .field("ocr", &self.ocr.is_some())
            .finish()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl TextExtractor {
    /// Extractor without OCR.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_pdf_text_chars: config.min_pdf_text_chars,
            ocr: None,
        }
    }

    /// Extractor using the configured OCR models when the `ocr` feature is
    /// enabled and `ocr_model_dir` is set.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        attach_configured_ocr(Self::new(config), config)
    }

    /// Use `engine` for images and scanned PDFs.
    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract text from `bytes` according to `ext`.
    pub fn extract_text(&self, bytes: &[u8], ext: &str) -> Result<String> {
        let format = DocumentFormat::from_extension(ext)?;
        debug!("Extracting text from {} bytes as {:?}", bytes.len(), format);

        match format {
            DocumentFormat::Pdf => self.extract_pdf(bytes),
            DocumentFormat::Image => {
                let image = image::load_from_memory(bytes).map_err(|e| ExtractionError::Parse {
                    format: "image",
                    reason: e.to_string(),
                })?;
                self.ocr_image(&image)
            }
            DocumentFormat::Docx => docx::extract_text(bytes),
            DocumentFormat::Xlsx => tabular::xlsx_to_text(bytes),
            DocumentFormat::Csv => tabular::csv_to_text(bytes),
            DocumentFormat::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    fn extract_pdf(&self, bytes: &[u8]) -> Result<String> {
        let document = PdfDocument::load(bytes)?;
        let text = document.text()?;

        let chars = text.chars().filter(|c| !c.is_whitespace()).count();
        if chars > self.min_pdf_text_chars {
            return Ok(text);
        }

        debug!(
            "PDF text layer has {} characters, falling back to OCR",
            chars
        );
        let images = document.images();
        if images.is_empty() {
            return Ok(text);
        }

        let pages = images
            .iter()
            .map(|image| self.ocr_image(image))
            .collect::<Result<Vec<_>>>()?;
        Ok(pages.join("\n"))
    }

    fn ocr_image(&self, image: &DynamicImage) -> Result<String> {
        let engine = self.ocr.as_ref().ok_or(ExtractionError::OcrUnavailable)?;
        engine.recognize(&prepare_for_ocr(image))
    }
}

#[cfg(feature = "ocr")]
fn attach_configured_ocr(extractor: TextExtractor, config: &ExtractionConfig) -> Result<TextExtractor> {
    match &config.ocr_model_dir {
        Some(dir) => Ok(extractor.with_ocr(Arc::new(PureOcrEngine::from_dir(dir)?))),
        None => Ok(extractor),
    }
}

#[cfg(not(feature = "ocr"))]
fn attach_configured_ocr(extractor: TextExtractor, config: &ExtractionConfig) -> Result<TextExtractor> {
    if config.ocr_model_dir.is_some() {
        tracing::warn!("ocr_model_dir is set but doclass was built without the `ocr` feature");
    }
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = GrayImage::from_pixel(8, 8, Luma([255u8]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("scan.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("dir.v2/notes"), "notes");
        assert_eq!(DocumentFormat::from_extension(".JPEG").unwrap(), DocumentFormat::Image);
    }

    #[test]
    fn test_is_supported_extension() {
        assert!(is_supported_extension("invoice.pdf"));
        assert!(is_supported_extension("Statement.XLSX"));
        assert!(!is_supported_extension("doc.xyz"));
        assert!(!is_supported_extension("pdf"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = TextExtractor::default().extract_text(b"data", "xyz").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type. Extension: xyz");
    }

    #[test]
    fn test_plain_text() {
        let text = TextExtractor::default().extract_text(b"Invoice Number: 42", "TXT").unwrap();
        assert_eq!(text, "Invoice Number: 42");
    }

    #[test]
    fn test_image_without_ocr_engine() {
        let err = TextExtractor::default().extract_text(&png_bytes(), "png").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrUnavailable));
    }

    #[test]
    fn test_image_with_ocr_engine() {
        let extractor = TextExtractor::default().with_ocr(Arc::new(FixedOcr("Driver's License")));
        assert_eq!(extractor.extract_text(&png_bytes(), "png").unwrap(), "Driver's License");
    }

    #[test]
    fn test_corrupt_image() {
        let extractor = TextExtractor::default().with_ocr(Arc::new(FixedOcr("x")));
        let err = extractor.extract_text(b"not an image", "jpg").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { format: "image", .. }));
    }
}
