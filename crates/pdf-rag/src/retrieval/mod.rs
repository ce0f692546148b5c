//! Retrieval-augmented query pipeline

pub mod orchestrator;

pub use orchestrator::{ProviderHealth, QueryOrchestrator, QueryOutcome};
