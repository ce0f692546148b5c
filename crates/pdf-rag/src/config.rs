//! Configuration for the PDF chat system
//!
//! Defaults are overlaid by an optional TOML file (`PDF_RAG_CONFIG`) and then by
//! process environment variables. No `.env` file is read.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Gemini embedding and generation configuration
    pub llm: LlmConfig,
    /// Qdrant configuration
    pub vector_db: VectorDbConfig,
    /// Query pipeline configuration
    pub query: QueryConfig,
    /// Ingestion queue configuration
    pub queue: QueueConfig,
    /// Chat client configuration
    pub client: ClientConfig,
}

impl RagConfig {
    /// Load defaults, then `PDF_RAG_CONFIG` (if set), then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("PDF_RAG_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Apply environment-style overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GOOGLE_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = lookup("GEMINI_EMBED_MODEL") {
            self.llm.embed_model = v;
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            self.llm.generate_model = v;
        }
        if let Some(v) = lookup("QDRANT_URL") {
            self.vector_db.url = v;
        }
        if let Some(v) = lookup("QDRANT_API_KEY") {
            self.vector_db.api_key = Some(v);
        }
        if let Some(v) = lookup("QDRANT_COLLECTION") {
            self.vector_db.collection = v;
        }
        if let Some(v) = lookup("QUEUE_DB_PATH") {
            self.queue.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("QUEUE_NAME") {
            self.queue.name = v;
        }
        if let Some(v) = lookup("UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = lookup("CHAT_SERVER_URL") {
            self.client.server_url = v;
        }
    }

    /// Check the options the server cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::Config("GOOGLE_API_KEY is not set".to_string()));
        }
        if self.vector_db.collection.trim().is_empty() {
            return Err(Error::Config("Qdrant collection name is empty".to_string()));
        }
        if self.query.top_k == 0 {
            return Err(Error::Config("query.top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
    /// Directory uploaded PDFs are written to
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Generative Language API base URL
    pub base_url: String,
    /// API key (GOOGLE_API_KEY)
    pub api_key: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            embed_model: "models/embedding-001".to_string(),
            generate_model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

/// Qdrant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Qdrant REST URL
    pub url: String,
    /// Optional API key for managed Qdrant
    pub api_key: Option<String>,
    /// Collection holding the PDF chunks
    pub collection: String,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "pdf_embeddings".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Query pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of passages retrieved per question
    pub top_k: usize,
    /// Character budget for the serialized context (0 = unbounded)
    pub max_context_chars: usize,
    /// Deadline for each remote step in seconds
    pub upstream_timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            max_context_chars: 12_000,
            upstream_timeout_secs: 60,
        }
    }
}

/// Ingestion queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue name jobs are published on
    pub name: String,
    /// SQLite file backing the queue
    pub database_path: PathBuf,
}

impl Default for QueueConfig {
    fn default() -> Self {
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdf-rag")
            .join("queue.db");

        Self {
            name: "file-upload-queue".to_string(),
            database_path,
        }
    }
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat server
    pub server_url: String,
    /// Deadline for one `/chat` round trip in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = RagConfig::default();
        assert_eq!(config.query.top_k, 2);
        assert_eq!(config.vector_db.collection, "pdf_embeddings");
        assert_eq!(config.queue.name, "file-upload-queue");
        assert_eq!(config.server.port, 8000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOOGLE_API_KEY", "secret"),
            ("QDRANT_URL", "http://qdrant:6333"),
            ("QDRANT_COLLECTION", "manuals"),
            ("PORT", "9001"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.vector_db.url, "http://qdrant:6333");
        assert_eq!(config.vector_db.collection, "manuals");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.llm.generate_model, "gemini-1.5-pro");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparsable_port_is_ignored() {
        let mut config = RagConfig::default();
        config.apply_env(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = RagConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml() {
        let config: RagConfig = toml::from_str(
            r#"
            [query]
            top_k = 4

            [vector_db]
            collection = "handbooks"
            "#,
        )
        .unwrap();

        assert_eq!(config.query.top_k, 4);
        assert_eq!(config.query.max_context_chars, 12_000);
        assert_eq!(config.vector_db.collection, "handbooks");
        assert_eq!(config.vector_db.url, "http://localhost:6333");
    }
}
