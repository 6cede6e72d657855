//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ReadprepError;

/// Main configuration for readprep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadprepConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Passage/question segmentation configuration.
    pub segmentation: SegmentationConfig,

    /// Generation service configuration.
    pub generation: GenerationConfig,

    /// Chat bot configuration.
    pub bot: BotConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR when a PDF has no usable text layer.
    pub enabled: bool,

    /// Keep `[UNK]` markers emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Pixel band used to group text boxes into rows when sorting.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keep_unk: false,
            row_tolerance: 20.0,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,

    /// Minimum trimmed text-layer length before OCR is skipped.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            min_text_length: 1,
        }
    }
}

/// Segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Lines searched on each side of the midpoint when no indicator matches.
    pub fallback_window: usize,

    /// Only accept uppercase answer tokens.
    pub case_sensitive_answers: bool,

    /// Extra indicator patterns, tried after the built-in ones.
    pub extra_indicators: Vec<String>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            fallback_window: 5,
            case_sensitive_answers: false,
            extra_indicators: Vec::new(),
        }
    }
}

/// Generation service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the Generative Language API.
    pub api_base: String,

    /// Model name.
    pub model: String,

    /// API key. Usually supplied through `GEMINI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            timeout_secs: 180,
        }
    }
}

/// Telegram bot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot API base URL.
    pub api_base: String,

    /// Bot token. Usually supplied through `BOT_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Long-poll timeout in seconds.
    pub poll_timeout_secs: u64,

    /// Documents converted at the same time.
    pub max_concurrent_jobs: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            token: None,
            poll_timeout_secs: 30,
            max_concurrent_jobs: 4,
        }
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Whether every model file is present on disk.
    pub fn is_available(&self) -> bool {
        [&self.detection_model, &self.recognition_model, &self.dictionary]
            .iter()
            .all(|name| self.model_dir.join(name).exists())
    }
}

impl ReadprepConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ReadprepError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReadprepError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ReadprepError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReadprepError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override secrets and model selection from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override secrets and model selection from a variable lookup.
    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Some(base) = non_empty("GEMINI_API_BASE") {
            self.generation.api_base = base;
        }
        if let Some(token) = non_empty("BOT_TOKEN") {
            self.bot.token = Some(token);
        }
        if let Some(dir) = non_empty("READPREP_MODEL_DIR") {
            self.models.model_dir = PathBuf::from(dir);
        }
        self
    }
}
