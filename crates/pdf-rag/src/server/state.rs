//! Application state for the chat server
//!
//! Provider handles are created once here and shared read-only by every request.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::processing::IngestionQueue;
use crate::providers::{
    EmbeddingProvider, GeminiClient, GeminiEmbedder, GeminiLlm, LlmProvider, QdrantVectorStore,
    VectorStoreProvider,
};
use crate::retrieval::QueryOrchestrator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Query pipeline over long-lived provider handles
    orchestrator: QueryOrchestrator,
    /// Producer side of the ingestion queue
    queue: IngestionQueue,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state with the Gemini and Qdrant providers
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let gemini = Arc::new(GeminiClient::new(&config.llm)?);
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(GeminiEmbedder::from_client(Arc::clone(&gemini)));
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiLlm::from_client(gemini));
        tracing::info!(
            "Gemini providers initialized (embedding: {}, llm: {})",
            config.llm.embed_model,
            config.llm.generate_model
        );

        let vector_store: Arc<dyn VectorStoreProvider> =
            Arc::new(QdrantVectorStore::new(&config.vector_db)?);
        tracing::info!(
            "Qdrant client initialized ({} / {})",
            config.vector_db.url,
            config.vector_db.collection
        );

        let orchestrator = QueryOrchestrator::new(embedder, vector_store, llm, &config.query);

        let queue = IngestionQueue::open(&config.queue.database_path, config.queue.name.clone())?;
        tracing::info!(
            "Ingestion queue '{}' at {}",
            config.queue.name,
            config.queue.database_path.display()
        );

        Self::from_parts(config, orchestrator, queue)
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: RagConfig,
        orchestrator: QueryOrchestrator,
        queue: IngestionQueue,
    ) -> Result<Self> {
        ensure_dir(&config.server.upload_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
                queue,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the query orchestrator
    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.inner.orchestrator
    }

    /// Get the ingestion queue
    pub fn queue(&self) -> &IngestionQueue {
        &self.inner.queue
    }

    /// Directory uploads are written to
    pub fn upload_dir(&self) -> &PathBuf {
        &self.inner.config.server.upload_dir
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Stop accepting work and release the queue handle
    pub fn shutdown(&self) {
        self.set_ready(false);
        self.inner.queue.close();
        tracing::info!("Application state shut down");
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        tracing::info!("Created upload directory {}", path.display());
    }
    Ok(())
}
