//! Text extraction for uploaded PDFs: text layer first, OCR second.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::config::{ModelConfig, OcrConfig, PdfConfig, ReadprepConfig};
use crate::models::document::{ExtractedDocument, TextSource};
use crate::ocr::{self, PageReader};
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::text::normalize;

/// Pulls document text out of PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    pdf: PdfConfig,
    ocr: OcrConfig,
    models: ModelConfig,
}

impl TextExtractor {
    /// Create an extractor from the relevant configuration sections.
    pub fn new(config: &ReadprepConfig) -> Self {
        Self {
            pdf: config.pdf.clone(),
            ocr: config.ocr.clone(),
            models: config.models.clone(),
        }
    }

    /// Extract text, loading the OCR engine only when the text layer is empty.
    ///
    /// Returns `Ok(None)` when neither route produced any text.
    pub fn extract(&self, data: &[u8]) -> Result<Option<ExtractedDocument>> {
        let pdf = PdfExtractor::from_bytes(data)?;
        if let Some(document) = self.text_layer(&pdf) {
            return Ok(Some(document));
        }

        match ocr::load_reader(&self.ocr, &self.models)? {
            Some(reader) => self.recognize(&pdf, reader.as_ref()),
            None => Ok(None),
        }
    }

    /// Extract text with a caller-supplied OCR engine.
    pub fn extract_with(
        &self,
        data: &[u8],
        reader: Option<&dyn PageReader>,
    ) -> Result<Option<ExtractedDocument>> {
        let pdf = PdfExtractor::from_bytes(data)?;
        if let Some(document) = self.text_layer(&pdf) {
            return Ok(Some(document));
        }

        match reader {
            Some(reader) => self.recognize(&pdf, reader),
            None => Ok(None),
        }
    }

    fn text_layer(&self, pdf: &PdfExtractor) -> Option<ExtractedDocument> {
        let text = match pdf.extract_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Text layer extraction failed: {}", e);
                return None;
            }
        };

        if text.trim().chars().count() < self.pdf.min_text_length.max(1) {
            debug!("Text layer too short, trying OCR");
            return None;
        }

        info!(
            "Using embedded text: {} pages, {} chars",
            pdf.page_count(),
            text.len()
        );
        ExtractedDocument::new(&text, TextSource::Embedded, pdf.page_count())
    }

    fn recognize(
        &self,
        pdf: &PdfExtractor,
        reader: &dyn PageReader,
    ) -> Result<Option<ExtractedDocument>> {
        let images = pdf.ocr_images(self.pdf.max_pages)?;

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let text = normalize(&reader.read_page(image)?);
            debug!("OCR page {}: {} chars", i + 1, text.len());
            if !text.is_empty() {
                pages.push(text);
            }
        }

        info!("OCR produced text on {} of {} images", pages.len(), images.len());
        Ok(ExtractedDocument::new(
            &pages.join("\n"),
            TextSource::Ocr,
            pdf.page_count(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, ReadprepError};
    use image::DynamicImage;
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct FixedReader {
        text: &'static str,
        calls: Cell<usize>,
    }

    impl PageReader for FixedReader {
        fn read_page(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.text.to_string())
        }
    }

    /// A one-page scan: an image and no text.
    fn scanned_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![200],
        ));
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q 1 0 0 1 0 0 cm /Im1 Do Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
            "MediaBox" => vec![0.into(), 0.into(), 1.into(), 1.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_invalid_pdf_is_error() {
        let result = TextExtractor::default().extract(b"not a pdf");
        assert!(matches!(result, Err(ReadprepError::Pdf(_))));
    }

    #[test]
    fn test_ocr_fallback_normalizes_text() {
        let reader = FixedReader {
            text: "Bees  \u{2014}\u{2013} wasps @ home\n1. Question?",
            calls: Cell::new(0),
        };
        let doc = TextExtractor::default()
            .extract_with(&scanned_pdf(), Some(&reader))
            .unwrap()
            .unwrap();

        assert_eq!(reader.calls.get(), 1);
        assert_eq!(doc.source, TextSource::Ocr);
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.text, "Bees wasps home 1. Question?");
    }

    #[test]
    fn test_no_reader_means_no_text() {
        let result = TextExtractor::default()
            .extract_with(&scanned_pdf(), None)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_blank_ocr_means_no_text() {
        let reader = FixedReader {
            text: " @@ ",
            calls: Cell::new(0),
        };
        let result = TextExtractor::default()
            .extract_with(&scanned_pdf(), Some(&reader))
            .unwrap();
        assert!(result.is_none());
    }
}
