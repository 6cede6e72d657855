//! Practice-page generation through an external language model.

mod artifact;
mod gemini;

pub use artifact::HtmlArtifact;
pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::GenerationError;

/// A text-generation service.
///
/// Implementations take a fully composed prompt and return the raw model
/// output. Validation of that output is left to [`HtmlArtifact`].
#[async_trait]
pub trait Generator: Send + Sync + Debug {
    /// Generate a response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
