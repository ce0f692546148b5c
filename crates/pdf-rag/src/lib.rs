//! pdf-rag: question answering over uploaded PDFs
//!
//! The server embeds a question with Gemini, retrieves the closest passages from
//! Qdrant, and answers with a grounded generation plus page-level citations.
//! Uploaded PDFs are stored on disk and handed to an ingestion worker through a
//! durable queue. The `client` module holds the chat conversation state machine.

pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod processing;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use retrieval::{QueryOrchestrator, QueryOutcome};
pub use types::{
    document::RetrievalResult,
    query::QueryRequest,
    response::{ChatResponse, Citation, QueryResponse},
};
