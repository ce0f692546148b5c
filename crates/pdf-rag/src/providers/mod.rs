//! Provider abstractions for embeddings, generation, and similarity search
//!
//! The orchestrator only sees these traits; remote response shapes are converted
//! into crate types inside each implementation.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod qdrant;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiClient, GeminiEmbedder, GeminiLlm};
pub use llm::{Generation, LlmProvider};
pub use qdrant::QdrantVectorStore;
pub use vector_store::VectorStoreProvider;
