//! PDF text layer and embedded image extraction using lopdf and pdf-extract.

use std::collections::HashSet;

use image::{DynamicImage, GrayImage, ImageBuffer, Rgb};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::Result;
use crate::error::ExtractionError;

fn parse_error(reason: impl ToString) -> ExtractionError {
    ExtractionError::Parse {
        format: "pdf",
        reason: reason.to_string(),
    }
}

/// A loaded PDF.
pub struct PdfDocument {
    document: Document,
    /// Bytes handed to pdf-extract (re-serialised when decrypted).
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Parse a PDF, decrypting it when it uses an empty user password.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(parse_error)?;

        let raw_data = if document.is_encrypted() {
            document
                .decrypt("")
                .map_err(|_| parse_error("document is encrypted"))?;
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| parse_error(format!("failed to save decrypted PDF: {e}")))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(parse_error("document has no pages"));
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Text of all pages.
    pub fn text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data).map_err(parse_error)
    }

    /// Embedded images, page by page.
    ///
    /// Images referenced from page resources come first; when no page
    /// references any, every image object in the file is returned.
    pub fn images(&self) -> Vec<DynamicImage> {
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut images = Vec::new();

        for (page_number, page_id) in self.document.get_pages() {
            let Some(resources) = self.page_resources(page_id) else {
                continue;
            };
            let Ok(xobjects) = resources.get(b"XObject") else {
                continue;
            };
            let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) else {
                continue;
            };

            for (_, reference) in xobjects.iter() {
                if let Object::Reference(id) = reference {
                    if !seen.insert(*id) {
                        continue;
                    }
                }
                if let Ok((_, object)) = self.document.dereference(reference) {
                    if let Some(image) = self.decode_image(object) {
                        trace!("Found image on page {}", page_number);
                        images.push(image);
                    }
                }
            }
        }

        if images.is_empty() {
            images = self
                .document
                .objects
                .values()
                .filter_map(|object| self.decode_image(object))
                .collect();
        }

        debug!("Found {} images in PDF", images.len());
        images
    }

    /// Resources of a page, following `Parent` links for inherited ones.
    fn page_resources(&self, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Ok(Object::Dictionary(node)) = self.document.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = node.get(b"Resources") {
            if let Ok((_, Object::Dictionary(resources))) = self.document.dereference(resources) {
                return Some(resources.clone());
            }
        }

        match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }

    fn decode_image(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        trace!("Image object {}x{}", width, height);

        let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(filters) => filters.first().and_then(|f| f.as_name().ok()),
            _ => None,
        });
        match filter {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping image with unsupported filter");
                return None;
            }
            _ => {}
        }

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Skipping image with {} bits per component", bits);
            return None;
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
                Object::Reference(id) => self
                    .document
                    .get_object(*id)
                    .ok()
                    .and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        raw_to_image(&data, width, height, color_space)
    }
}

/// Build an image from uncompressed 8-bit samples.
fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let samples = data.get(..pixels.checked_mul(3)?)?.to_vec();
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            let samples = data.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("Unsupported color space {}", String::from_utf8_lossy(other));
            None
        }
    }
}
