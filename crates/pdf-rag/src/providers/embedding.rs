//! Question embedding

use async_trait::async_trait;

use crate::error::Result;

/// Maps a question to the vector space the PDF chunks were indexed in.
///
/// The model must match the one the ingestion worker used, or similarity
/// scores are meaningless. `GeminiEmbedder` is the production implementation.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one question
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vector length produced by `embed`
    fn dimensions(&self) -> usize;

    /// Whether the embedding endpoint answers
    async fn health_check(&self) -> Result<bool>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}
