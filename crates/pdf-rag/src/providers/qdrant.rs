//! Qdrant similarity search over the REST API
//!
//! Points are expected in the layout the ingestion worker writes: payload
//! `{ content, metadata: { source, loc: { pageNumber } } }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::VectorStoreProvider;
use crate::types::{DocumentMetadata, RetrievalResult};

/// Qdrant collection client
pub struct QdrantVectorStore {
    client: Client,
    url: String,
    collection: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: Option<PointPayload>,
}

#[derive(Deserialize)]
struct PointPayload {
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: DocumentMetadata,
}

impl ScoredPoint {
    fn into_result(self) -> Option<RetrievalResult> {
        let payload = self.payload?;
        Some(RetrievalResult {
            passage_text: payload.content,
            source_path: payload.metadata.source,
            page_number: payload.metadata.loc.and_then(|loc| loc.page_number),
        })
    }
}

impl SearchResponse {
    /// Points in descending score order; points without payload are dropped
    fn into_results(mut self) -> Vec<RetrievalResult> {
        self.result
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        self.result
            .into_iter()
            .filter_map(ScoredPoint::into_result)
            .collect()
    }
}

impl QdrantVectorStore {
    /// Create a client for the configured collection
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/collections/{}/points/search", self.url, self.collection)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantVectorStore {
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>> {
        let request = SearchRequest {
            vector: query_embedding,
            limit: top_k,
            with_payload: true,
        };

        let response = self
            .request(self.client.post(self.search_url()))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Qdrant search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_db(format!(
                "Qdrant search failed ({}): {}",
                status, body
            )));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse Qdrant response: {}", e)))?;

        let mut results = search_response.into_results();
        results.truncate(top_k);
        tracing::debug!("Qdrant returned {} points from '{}'", results.len(), self.collection);
        Ok(results)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/collections/{}", self.url, self.collection);
        match self.request(self.client.get(&url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
