//! Similarity search over indexed PDF chunks

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievalResult;

/// Read side of the chunk index.
///
/// `search` returns at most `top_k` passages, most relevant first. An empty
/// index yields an empty list, not an error. `QdrantVectorStore` talks to Qdrant.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>>;

    /// Whether the collection is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}
