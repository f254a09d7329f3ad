pub mod gemini;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Failures at the generative-endpoint seam. `GenerationFailed` on the
/// completion path, `EmbeddingFailed` on the embedding path; both cover
/// transport errors, timeouts, non-2xx statuses and malformed bodies.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("generation request failed: {0}")]
    GenerationFailed(String),
    #[error("embedding request failed: {0}")]
    EmbeddingFailed(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// The generation-client boundary: free-text completion and text embedding.
/// Both calls are synchronous network round-trips with explicit timeouts;
/// neither retries.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> ModelResult<String>;
    async fn embed(&self, text: &str) -> ModelResult<Vec<f32>>;
}

/// Canned-response model for offline runs and tests. `complete` pops from a
/// script of queued replies (repeating the last one when exhausted) and
/// `embed` returns a fixed small vector.
#[derive(Default)]
pub struct StubModel {
    replies: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(replies: Vec<String>) -> Self {
        let mut replies = replies;
        // popped back-to-front
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
        }
    }

    pub fn single(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn complete(&self, _prompt: &str) -> ModelResult<String> {
        let mut replies = self.replies.lock().expect("stub replies lock");
        match replies.len() {
            0 => Ok(String::new()),
            1 => Ok(replies[0].clone()),
            _ => Ok(replies.pop().unwrap_or_default()),
        }
    }

    async fn embed(&self, _text: &str) -> ModelResult<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// A model whose every call fails. Used to exercise degraded paths.
pub struct FailingModel;

#[async_trait]
impl TextModel for FailingModel {
    async fn complete(&self, _prompt: &str) -> ModelResult<String> {
        Err(ModelError::GenerationFailed("stubbed outage".into()))
    }

    async fn embed(&self, _text: &str) -> ModelResult<Vec<f32>> {
        Err(ModelError::EmbeddingFailed("stubbed outage".into()))
    }
}
