//! Chroma vector-store client (v2 REST API).
//!
//! The store is a soft enrichment signal: every public read path degrades to
//! an empty result instead of failing the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{FactMetadata, FactSource, RetrievalError, RetrievedFact, SeedFact};
use habitworth_provider::TextModel;
use habitworth_schema::ChromaConfig;

const API_PREFIX: &str = "/api/v2/tenants/default_tenant/databases/default_database";

/// Vector-store round-trips are expected to be fast; fail them quickly
/// rather than hold a worker for the full generative timeout.
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ChromaStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    embedder: Arc<dyn TextModel>,
}

impl ChromaStore {
    pub fn new(base_url: impl Into<String>, embedder: Arc<dyn TextModel>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(STORE_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: "habit_facts".to_string(),
            embedder,
        }
    }

    pub fn from_config(config: &ChromaConfig, embedder: Arc<dyn TextModel>) -> Self {
        Self::new(config.base_url.clone(), embedder).with_collection(config.collection.clone())
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, suffix)
    }

    /// Create the backing collection if it does not exist yet. Idempotent:
    /// "already exists" and every other failure are logged and swallowed —
    /// a cold search against a missing collection still fails safe.
    pub async fn ensure_collection(&self) {
        let body = json!({
            "name": self.collection,
            "metadata": {"description": "habit cost reference facts"}
        });

        let result = self
            .client
            .post(self.url("/collections"))
            .json(&body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status() == StatusCode::OK => {
                info!(collection = %self.collection, "collection created");
            }
            Ok(resp) => {
                info!(
                    collection = %self.collection,
                    status = %resp.status(),
                    "collection not created (may already exist)"
                );
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "collection bootstrap failed");
            }
        }
    }

    /// Look up the opaque collection id by name. Required before any search
    /// or insert; the store addresses collections by id, not name.
    pub async fn resolve_collection_id(&self) -> Result<String, RetrievalError> {
        let resp = self
            .client
            .get(self.url(&format!("/collections/{}", self.collection)))
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(RetrievalError::Unavailable(format!(
                "collection lookup returned {status}"
            )));
        }

        let body: CollectionInfo = resp
            .json()
            .await
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;

        if body.id.is_empty() {
            return Err(RetrievalError::MalformedResponse(
                "collection lookup response missing id".into(),
            ));
        }
        Ok(body.id)
    }

    /// Write one reference document with its embedding. Used by the seed
    /// loader only; failures are logged and swallowed (duplicate ids may be
    /// skipped by the store itself).
    pub async fn upsert(&self, fact: &SeedFact) {
        if let Err(e) = self.try_upsert(fact).await {
            warn!(id = %fact.id, error = %e, "document upsert failed");
        } else {
            debug!(id = %fact.id, "document added");
        }
    }

    async fn try_upsert(&self, fact: &SeedFact) -> Result<(), RetrievalError> {
        let collection_id = self.resolve_collection_id().await?;
        let embedding = self.embedder.embed(fact.content).await?;

        let body = json!({
            "ids": [fact.id],
            "documents": [fact.content],
            "metadatas": [{
                "category": fact.category,
                "source": fact.source,
                "costType": fact.cost_type,
            }],
            "embeddings": [embedding],
        });

        let resp = self
            .client
            .post(self.url(&format!("/collections/{collection_id}/add")))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Unavailable(format!(
                "add returned {status}"
            )));
        }
        Ok(())
    }

    async fn try_search(
        &self,
        query: &str,
        k: usize,
        category: Option<&str>,
    ) -> Result<Vec<RetrievedFact>, RetrievalError> {
        let collection_id = self.resolve_collection_id().await?;
        let query_embedding = self.embedder.embed(query).await?;

        let mut body = json!({
            "query_embeddings": [query_embedding],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(category) = category {
            body["where"] = json!({"category": category});
        }

        let resp = self
            .client
            .post(self.url(&format!("/collections/{collection_id}/query")))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(RetrievalError::Unavailable(format!(
                "query returned {status}"
            )));
        }

        let body: QueryResponse = resp
            .json()
            .await
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;

        Ok(flatten_query_response(body))
    }
}

#[async_trait::async_trait]
impl FactSource for ChromaStore {
    async fn search(&self, query: &str, k: usize, category: Option<&str>) -> Vec<RetrievedFact> {
        match self.try_search(query, k, category).await {
            Ok(facts) => {
                info!(count = facts.len(), category = ?category, "grounding facts retrieved");
                facts
            }
            Err(e) => {
                warn!(error = %e, "similarity search failed, continuing without grounding");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    id: String,
}

/// Raw query response: one outer element per submitted query. This core
/// always submits exactly one, so only row 0 matters.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<FactMetadata>>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

/// Normalize the nested per-query arrays into a flat list. The store
/// returns hits in ascending-distance order already; that order is kept.
fn flatten_query_response(body: QueryResponse) -> Vec<RetrievedFact> {
    let documents = body.documents.into_iter().next().unwrap_or_default();
    let mut metadatas = body.metadatas.into_iter().next().unwrap_or_default();
    let distances = body.distances.into_iter().next().unwrap_or_default();

    let mut facts = Vec::with_capacity(documents.len());
    for (i, document) in documents.into_iter().enumerate() {
        let Some(content) = document else { continue };
        let metadata = metadatas
            .get_mut(i)
            .and_then(Option::take)
            .unwrap_or_default();
        let distance = distances.get(i).copied().unwrap_or(0.0);
        facts.push(RetrievedFact {
            content,
            metadata,
            distance,
            similarity: 1.0 - distance,
        });
    }
    facts
}
