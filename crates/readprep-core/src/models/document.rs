//! Extracted document model.

use serde::{Deserialize, Serialize};

/// Where the document text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// The PDF's own text layer.
    Embedded,
    /// OCR over page images (normalized).
    Ocr,
}

/// Text extracted from one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Document text, trimmed.
    pub text: String,
    /// Origin of the text.
    pub source: TextSource,
    /// Number of pages in the source PDF.
    pub page_count: u32,
}

impl ExtractedDocument {
    /// Wrap extracted text, returning `None` when it is blank.
    pub fn new(text: &str, source: TextSource, page_count: u32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            source,
            page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_rejected() {
        assert!(ExtractedDocument::new(" \n\t ", TextSource::Embedded, 1).is_none());
    }

    #[test]
    fn test_text_is_trimmed() {
        let doc = ExtractedDocument::new("\n Passage \n", TextSource::Ocr, 2).unwrap();
        assert_eq!(doc.text, "Passage");
        assert_eq!(doc.source, TextSource::Ocr);
    }
}
