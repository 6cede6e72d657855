//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF reader backed by lopdf, with pdf-extract for the text layer.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a document straight from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(PdfError::NotLoaded)
    }

    /// Images for OCR from the first `max_pages` pages (0 = all pages).
    ///
    /// Pages whose resources hold no decodable image are skipped. When no
    /// page yields anything, every image object in the file is tried once,
    /// which recovers scans whose XObjects are not reachable from the page
    /// tree.
    pub fn ocr_images(&self, max_pages: usize) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let limit = if max_pages == 0 { usize::MAX } else { max_pages };
        let last = (self.page_count() as usize).min(limit) as u32;

        let mut images = Vec::new();
        for page in 1..=last {
            match self.page_images(page) {
                Ok(found) => images.extend(found),
                Err(e) => debug!("Skipping images on page {}: {}", page, e),
            }
        }

        if images.is_empty() {
            debug!("No page images found, scanning all objects");
            images = doc
                .objects
                .values()
                .filter_map(|object| decode_image(doc, object))
                .take(limit)
                .collect();
        }

        debug!("Collected {} images for OCR", images.len());
        Ok(images)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = page_resources(doc, page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) {
                    for (_, reference) in xobjects.iter() {
                        if let Ok((_, object)) = doc.dereference(reference) {
                            images.extend(decode_image(doc, object));
                        }
                    }
                }
            }
        }

        trace!("Decoded {} images on page {}", images.len(), page);
        Ok(images)
    }
}

/// Resources of a page, walking up the page tree for inherited entries.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = node.get(b"Resources") {
        if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
            return Some(resources.clone());
        }
    }

    match node.get(b"Parent") {
        Ok(Object::Reference(parent)) => page_resources(doc, *parent),
        _ => None,
    }
}

fn decode_image(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

    match first_filter(dict) {
        Some(b"DCTDecode") => {
            trace!("Decoding {}x{} JPEG image", width, height);
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter on {}x{} image", width, height);
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
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let samples = raw_samples(stream);
    let color_space = color_space(doc, dict).unwrap_or(b"DeviceRGB");
    raw_image(&samples, width, height, color_space)
}

fn first_filter(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

fn color_space<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a [u8]> {
    match dict.get(b"ColorSpace").ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(parts) => parts.first().and_then(|o| o.as_name().ok()),
        Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

fn raw_samples(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Build an image from uncompressed 8-bit samples.
fn raw_image(samples: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;

    let image = match color_space {
        b"DeviceGray" | b"G" | b"CalGray" => {
            let data = samples.get(..pixels)?.to_vec();
            DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, data)?)
        }
        b"DeviceRGB" | b"RGB" | b"CalRGB" => {
            let data = samples.get(..pixels * 3)?.to_vec();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data)?)
        }
        b"DeviceCMYK" | b"CMYK" => {
            let data = samples
                .get(..pixels * 4)?
                .chunks_exact(4)
                .flat_map(|cmyk| cmyk_to_rgb(cmyk[0], cmyk[1], cmyk[2], cmyk[3]))
                .collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data)?)
        }
        other => {
            trace!("Unsupported color space {:?}", String::from_utf8_lossy(other));
            return None;
        }
    };

    Some(image)
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let white = 255 - k as u16;
    let channel = |v: u8| ((255 - v as u16) * white / 255) as u8;
    [channel(c), channel(m), channel(y)]
}
