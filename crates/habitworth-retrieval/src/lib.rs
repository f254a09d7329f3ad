pub mod chroma;
pub mod seed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chroma::ChromaStore;
pub use seed::{load_seed_data, seed_facts, SeedFact};

use habitworth_provider::ModelError;

/// Failures at the vector-store seam. These stay inside the retrieval layer:
/// the public `search` contract degrades to an empty result instead of
/// propagating them.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("vector store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Embedding(#[from] ModelError),
    #[error("malformed store response: {0}")]
    MalformedResponse(String),
}

/// Metadata attached to a grounding fact. All fields optional: the store
/// does not enforce a schema on document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactMetadata {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "costType")]
    pub cost_type: Option<String>,
}

/// One grounding snippet from a similarity search. Produced fresh per query,
/// never persisted by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedFact {
    pub content: String,
    pub metadata: FactMetadata,
    /// Raw distance from the store; lower is closer.
    pub distance: f32,
    /// Rough similarity, `1.0 - distance`.
    pub similarity: f32,
}

/// The retrieval seam the orchestrator depends on. Searches are best-effort:
/// on any failure the impl returns an empty list, never an error, so
/// retrieval can enrich a prompt but never block one.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn search(&self, query: &str, k: usize, category: Option<&str>) -> Vec<RetrievedFact>;
}

/// A source that finds nothing. Stands in for a cold or absent store.
pub struct EmptyFactSource;

#[async_trait]
impl FactSource for EmptyFactSource {
    async fn search(&self, _query: &str, _k: usize, _category: Option<&str>) -> Vec<RetrievedFact> {
        Vec::new()
    }
}
