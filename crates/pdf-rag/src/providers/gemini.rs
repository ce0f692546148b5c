//! Gemini providers for embeddings and answer generation
//!
//! Talks to the Generative Language REST API with an API key. One `GeminiClient`
//! holds the pooled HTTP client and is shared by the embedder and the LLM.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{Generation, LlmProvider};

/// embedding-001 produces 768-dim vectors
const EMBEDDING_DIMENSIONS: usize = 768;

/// Shared Generative Language API client
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Convert the first candidate into a `Generation`
    fn into_generation(self, model: &str) -> Generation {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Generation {
                text: None,
                model: model.to_string(),
                finish_reason: None,
            };
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Generation {
            text: (!text.is_empty()).then_some(text),
            model: model.to_string(),
            finish_reason: candidate.finish_reason,
        }
    }
}

impl GeminiClient {
    /// Create a new client; the HTTP pool lives as long as the client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn embed_url(&self) -> String {
        format!(
            "{}/{}:embedContent",
            self.config.base_url.trim_end_matches('/'),
            model_path(&self.config.embed_model)
        )
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model_path(&self.config.generate_model)
        )
    }

    /// Generate an embedding for one text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = model_path(&self.config.embed_model);
        let request = EmbedRequest {
            model: &model,
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
        };

        let response = self
            .client
            .post(self.embed_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Gemini embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Gemini embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse Gemini embedding response: {}", e)))?;

        embed_response
            .embedding
            .map(|e| e.values)
            .filter(|values| !values.is_empty())
            .ok_or_else(|| Error::embedding("No embedding in Gemini response"))
    }

    /// Generate text for a prompt
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        tracing::info!("Generating answer with model: {}", self.config.generate_model);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "Gemini generation failed ({}): {}",
                status, body
            )));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(gen_response.into_generation(&self.config.generate_model))
    }

    /// Check that the API key is accepted
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generation model name
    pub fn generate_model(&self) -> &str {
        &self.config.generate_model
    }
}

/// Model names are accepted with or without the `models/` prefix
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Gemini embedding provider
pub struct GeminiEmbedder {
    client: Arc<GeminiClient>,
}

impl GeminiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Gemini generation provider
pub struct GeminiLlm {
    client: Arc<GeminiClient>,
}

impl GeminiLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmProvider for GeminiLlm {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        self.client.generate(prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        self.client.generate_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_path() {
        assert_eq!(model_path("models/embedding-001"), "models/embedding-001");
        assert_eq!(model_path("gemini-1.5-flash"), "models/gemini-1.5-flash");
    }

    #[test]
    fn test_urls() {
        let client = GeminiClient::new(&LlmConfig::default()).unwrap();
        assert_eq!(
            client.embed_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:embedContent"
        );
        assert_eq!(
            client.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_generation_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Refunds are " }, { "text": "accepted." }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let generation = response.into_generation("gemini-1.5-flash");
        assert_eq!(generation.text.as_deref(), Some("Refunds are accepted."));
        assert_eq!(generation.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(generation.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_blocked_generation_has_no_text() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        let generation = response.into_generation("gemini-1.5-flash");
        assert!(generation.text.is_none());
        assert_eq!(generation.finish_reason.as_deref(), Some("SAFETY"));

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.into_generation("gemini-1.5-flash").text.is_none());
    }

    #[test]
    fn test_embed_request_shape() {
        let request = EmbedRequest {
            model: "models/embedding-001",
            content: Content {
                role: None,
                parts: vec![Part { text: "hello" }],
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({
            "model": "models/embedding-001",
            "content": { "parts": [{ "text": "hello" }] }
        }));
    }
}
