//! End-to-end conversion of a reading-test PDF into a practice page.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ReadprepError, Result};
use crate::extract::TextExtractor;
use crate::generation::{GeminiGenerator, Generator, HtmlArtifact};
use crate::models::config::ReadprepConfig;
use crate::models::document::ExtractedDocument;
use crate::practice::{Segmentation, Segmenter};
use crate::prompt::compose_prompt;

/// A composed prompt and what it was built from.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub document: ExtractedDocument,
    pub segmentation: Segmentation,
    pub prompt: String,
}

/// Runs extraction, segmentation, prompt composition and generation.
///
/// Cheap to clone; the generator is shared.
#[derive(Debug, Clone)]
pub struct PracticeConverter {
    extractor: TextExtractor,
    segmenter: Arc<Segmenter>,
    generator: Arc<dyn Generator>,
}

impl PracticeConverter {
    /// Create a converter with an explicit generator.
    pub fn new(config: &ReadprepConfig, generator: Arc<dyn Generator>) -> Result<Self> {
        Ok(Self {
            extractor: TextExtractor::new(config),
            segmenter: Arc::new(Segmenter::from_config(&config.segmentation)?),
            generator,
        })
    }

    /// Create a converter backed by the Gemini API.
    pub fn from_config(config: &ReadprepConfig) -> Result<Self> {
        let generator = GeminiGenerator::new(&config.generation)?;
        Self::new(config, Arc::new(generator))
    }

    /// Extract text on the blocking pool.
    pub async fn extract(&self, data: Vec<u8>) -> Result<Option<ExtractedDocument>> {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&data)).await?
    }

    /// Extract, segment and compose without calling the generator.
    ///
    /// Fails with [`ReadprepError::NoText`] when there is nothing to build a
    /// page from.
    pub async fn prepare(&self, data: Vec<u8>) -> Result<PreparedPrompt> {
        let document = self.extract(data).await?.ok_or(ReadprepError::NoText)?;
        self.prepare_text(document)
    }

    /// Segment and compose already extracted text.
    pub fn prepare_text(&self, document: ExtractedDocument) -> Result<PreparedPrompt> {
        let segmentation = self.segmenter.segment(document.text.as_str());
        if segmentation.is_empty() {
            return Err(ReadprepError::NoText);
        }

        let prompt = compose_prompt(&segmentation);
        debug!(
            "Composed prompt: {} chars, {} questions, {} answers",
            prompt.len(),
            segmentation.questions.len(),
            segmentation.answers.len()
        );

        Ok(PreparedPrompt {
            document,
            segmentation,
            prompt,
        })
    }

    /// Generate and validate a page from a prepared prompt.
    pub async fn generate(&self, prepared: &PreparedPrompt) -> Result<HtmlArtifact> {
        let raw = self.generator.generate(&prepared.prompt).await?;
        let artifact = HtmlArtifact::from_response(&raw)?;
        info!("Generated {} ({} bytes)", artifact.file_name, artifact.len());
        Ok(artifact)
    }

    /// Convert PDF bytes into a practice page.
    pub async fn convert(&self, data: Vec<u8>) -> Result<HtmlArtifact> {
        let prepared = self.prepare(data).await?;
        self.generate(&prepared).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::models::document::TextSource;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for Recorder {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn converter(reply: &str) -> (PracticeConverter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            reply: reply.to_string(),
            ..Default::default()
        });
        let converter = PracticeConverter::new(&ReadprepConfig::default(), recorder.clone()).unwrap();
        (converter, recorder)
    }

    fn document(text: &str) -> ExtractedDocument {
        ExtractedDocument::new(text, TextSource::Embedded, 1).unwrap()
    }

    #[test]
    fn test_prepare_text() {
        let (converter, _) = converter("");
        let prepared = converter
            .prepare_text(document("Intro paragraph.\nQuestions 1-2\n1. Is X true?\nTRUE"))
            .unwrap();
        assert_eq!(prepared.segmentation.passage, "Intro paragraph.");
        assert!(prepared.prompt.contains("The passage text is: Intro paragraph."));
    }

    #[tokio::test]
    async fn test_generate_validates_html() {
        let (converter, recorder) = converter("```html\n<html><body>ok</body></html>\n```");
        let prepared = converter.prepare_text(document("Story.\n1. Question")).unwrap();

        let artifact = converter.generate(&prepared).await.unwrap();
        assert_eq!(artifact.html, "<html><body>ok</body></html>");

        let prompts = recorder.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], prepared.prompt);
    }

    #[tokio::test]
    async fn test_malformed_output() {
        let (converter, _) = converter("I could not do that");
        let prepared = converter.prepare_text(document("Story.\n1. Question")).unwrap();
        assert!(matches!(
            converter.generate(&prepared).await,
            Err(ReadprepError::Generation(GenerationError::MalformedHtml))
        ));
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_not_sent() {
        let (converter, recorder) = converter("<html></html>");
        let result = converter.convert(b"garbage".to_vec()).await;
        assert!(matches!(result, Err(ReadprepError::Pdf(_))));
        assert!(recorder.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_gemini_requires_key() {
        assert!(matches!(
            PracticeConverter::from_config(&ReadprepConfig::default()),
            Err(ReadprepError::Generation(GenerationError::MissingApiKey))
        ));
    }
}
