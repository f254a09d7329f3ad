//! Google Gemini generation + embedding client
//!
//! https://ai.google.dev/api/generate-content

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ModelError, ModelResult, TextModel};
use habitworth_schema::GeminiConfig;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Timeout for the generative path. Deliberately generous: a valuation
/// completion can take tens of seconds.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(GENERATION_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: "gemini-2.0-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        let mut client = Self::new(config.api_key.clone());
        client.model = config.model.clone();
        client.embedding_model = config.embedding_model.clone();
        client.base_url = config.base_url.clone();
        client
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl TextModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::GenerationFailed(transport_detail(&e)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::GenerationFailed(status_detail(status, &text)));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::GenerationFailed(format!("invalid response body: {e}")))?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| ModelError::GenerationFailed("empty candidates".into()))?;

        debug!(chars = text.len(), "gemini completion received");
        Ok(text)
    }

    async fn embed(&self, text: &str) -> ModelResult<Vec<f32>> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.base_url, self.embedding_model, self.api_key
        );

        let payload = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::EmbeddingFailed(transport_detail(&e)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::EmbeddingFailed(status_detail(status, &text)));
        }

        let body: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::EmbeddingFailed(format!("invalid response body: {e}")))?;

        if body.embedding.values.is_empty() {
            return Err(ModelError::EmbeddingFailed("empty embedding".into()));
        }

        debug!(dims = body.embedding.values.len(), "embedding received");
        Ok(body.embedding.values)
    }
}

fn transport_detail(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connect error: {e}")
    } else {
        e.to_string()
    }
}

fn status_detail(status: StatusCode, text: &str) -> String {
    let retryable = match status.as_u16() {
        429 | 500..=599 => " [retryable]",
        _ => "",
    };
    format!("status {status}{retryable}: {text}")
}

// ============================================================
// Gemini API Types
// ============================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
