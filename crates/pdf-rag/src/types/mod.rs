//! Core types for the query pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{DocumentMetadata, Location, RetrievalResult, SearchDocument};
pub use query::QueryRequest;
pub use response::{AiContent, ChatResponse, Citation, QueryResponse, NO_RESPONSE_FALLBACK};
