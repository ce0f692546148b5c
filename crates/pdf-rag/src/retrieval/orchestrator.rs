//! Question answering over the uploaded PDF
//!
//! One call runs embed → search → prompt → generate and shapes the result.
//! The orchestrator keeps no per-request state, so a single instance is shared
//! by every request handler.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, Generation, LlmProvider, VectorStoreProvider};
use crate::types::response::{AiContentKwargs, ResponseMetadata};
use crate::types::{AiContent, ChatResponse, QueryResponse, RetrievalResult, SearchDocument};

/// Everything one answered question produced
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Typed answer and citations
    pub response: QueryResponse,
    /// Retrieved passages, relevance order
    pub results: Vec<RetrievalResult>,
    /// Raw generation output
    pub generation: Generation,
}

impl QueryOutcome {
    /// Wire body for `POST /chat`
    pub fn to_chat_response(&self) -> ChatResponse {
        ChatResponse {
            ai_content: Some(AiContent {
                kwargs: Some(AiContentKwargs {
                    content: Some(self.response.answer_text.clone()),
                    response_metadata: ResponseMetadata {
                        model: Some(self.generation.model.clone()),
                        finish_reason: self.generation.finish_reason.clone(),
                    },
                }),
            }),
            similarity_search_results: Some(self.results.iter().map(SearchDocument::from).collect()),
        }
    }
}

/// Reachability of each remote capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProviderHealth {
    pub embedding: bool,
    pub index: bool,
    pub generation: bool,
}

impl ProviderHealth {
    pub fn all_up(&self) -> bool {
        self.embedding && self.index && self.generation
    }
}

/// Composes the embedding, index, and generation clients
#[derive(Clone)]
pub struct QueryOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    prompt_builder: PromptBuilder,
    top_k: usize,
    step_timeout: Duration,
}

impl QueryOrchestrator {
    /// Create an orchestrator over long-lived provider handles
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &QueryConfig,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            llm,
            prompt_builder: PromptBuilder::new(config.max_context_chars),
            top_k: config.top_k,
            step_timeout: Duration::from_secs(config.upstream_timeout_secs),
        }
    }

    /// Override the per-step deadline
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Number of passages retrieved per question
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Probe the three remote capabilities
    pub async fn health_check(&self) -> ProviderHealth {
        let (embedding, index, generation) = tokio::join!(
            self.embedder.health_check(),
            self.vector_store.health_check(),
            self.llm.health_check(),
        );

        ProviderHealth {
            embedding: embedding.unwrap_or(false),
            index: index.unwrap_or(false),
            generation: generation.unwrap_or(false),
        }
    }

    /// Answer a question from the indexed PDF
    ///
    /// Fails with `InvalidInput` for a blank question before any remote call.
    /// Any embedding, search, or generation failure aborts the whole answer.
    pub async fn answer(&self, question: &str) -> Result<QueryOutcome> {
        if question.trim().is_empty() {
            return Err(Error::invalid_input("Question must not be empty"));
        }

        let start = Instant::now();
        tracing::info!("Query: \"{}\"", question);

        let query_embedding = self
            .bounded("embedding", self.embedder.embed(question))
            .await?;
        tracing::debug!("Embedded question ({} dims)", query_embedding.len());

        let mut results = self
            .bounded("similarity search", self.vector_store.search(&query_embedding, self.top_k))
            .await?;
        results.truncate(self.top_k);

        if results.is_empty() {
            tracing::warn!("No passages matched; answering with empty context");
        }

        let prompt = self.prompt_builder.build(question, &results)?;
        if prompt.truncated {
            tracing::warn!(
                "Context budget reached: {} of {} passages in prompt",
                prompt.passages_included,
                results.len()
            );
        }
        tracing::debug!("Built prompt ({} chars)", prompt.text.len());

        let generation = self
            .bounded("generation", self.llm.generate(&prompt.text))
            .await?;

        let response = QueryResponse::new(generation.text.clone(), &results);

        tracing::info!(
            "Query completed in {}ms, {} citations",
            start.elapsed().as_millis(),
            response.citations.len()
        );

        Ok(QueryOutcome {
            response,
            results,
            generation,
        })
    }

    /// Run one remote step under the step deadline
    async fn bounded<T, F>(&self, stage: &'static str, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.step_timeout, step).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                stage,
                secs: self.step_timeout.as_secs(),
            }),
        }
    }
}
