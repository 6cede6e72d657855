//! Core library for IELTS reading practice generation.
//!
//! This crate provides:
//! - PDF processing (text layer and embedded page images)
//! - OCR fallback for scanned documents
//! - Text normalization for OCR output
//! - Passage / question / answer segmentation
//! - Prompt composition and HTML practice-page generation

pub mod error;
pub mod models;
pub mod pdf;
pub mod ocr;
pub mod text;
pub mod practice;
pub mod prompt;
pub mod generation;
pub mod extract;
pub mod converter;

pub use error::{ReadprepError, Result};
pub use models::config::ReadprepConfig;
pub use models::document::{ExtractedDocument, TextSource};
pub use ocr::{OcrResult, PageReader, TextBox};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use text::normalize;
pub use practice::{segment, AnswerToken, Choice, Segmentation, Segmenter, SplitReason};
pub use prompt::{compose_prompt, compose_prompt_from_text};
pub use generation::{GeminiGenerator, Generator, HtmlArtifact};
pub use extract::TextExtractor;
pub use converter::{PracticeConverter, PreparedPrompt};
