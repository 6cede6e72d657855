use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::Generator;
use crate::error::GenerationError;
use crate::models::config::GenerationConfig;

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone, Debug)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiGenerator {
    /// Build a client from configuration. Fails without an API key.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GenerationError::ClientBuild)?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        debug!("Gemini endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        info!("Requesting generation ({} prompt chars)", prompt.len());
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(GenerationError::Deserialization)?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!("Generation returned {} chars", text.len());
        Ok(text)
    }
}
