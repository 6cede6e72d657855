//! Error types for the readprep-core library.

use thiserror::Error;

/// Main error type for the readprep library.
#[derive(Error, Debug)]
pub enum ReadprepError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Practice-page generation error.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document produced no passage and no questions.
    #[error("no usable text found in document")]
    NoText,

    /// A blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// No document has been loaded yet.
    #[error("no document loaded")]
    NotLoaded,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// OCR support was not compiled in.
    #[error("OCR support is disabled in this build")]
    Disabled,
}

/// Errors from the external generation service.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    /// The request never got a response.
    #[error("failed to send request to generation API: {0}")]
    Request(reqwest::Error),

    /// The API answered with a non-success status.
    #[error("generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("failed to deserialize generation response: {0}")]
    Deserialization(reqwest::Error),

    /// The response held no candidate text.
    #[error("generation API returned no content")]
    EmptyResponse,

    /// No API key configured.
    #[error("API key is missing")]
    MissingApiKey,

    /// The generated text is not an HTML document.
    #[error("generated content is not an HTML document")]
    MalformedHtml,
}

/// Result type for the readprep library.
pub type Result<T> = std::result::Result<T, ReadprepError>;
