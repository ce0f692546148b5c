//! Query request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Message returned for a missing, non-string, or blank query
pub const INVALID_QUERY_MESSAGE: &str = "Query is required and must be a string";

/// Body of `POST /chat`
///
/// `query` is kept as raw JSON so that a number or object is rejected with the
/// same message as a missing field instead of a deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<serde_json::Value>,
}

impl QueryRequest {
    /// Create a request for the given question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            query: Some(serde_json::Value::String(question.into())),
        }
    }

    /// Return the question text, rejecting anything that is not a non-blank string
    pub fn question(&self) -> Result<&str> {
        match &self.query {
            Some(serde_json::Value::String(q)) if !q.trim().is_empty() => Ok(q.as_str()),
            _ => Err(Error::invalid_input(INVALID_QUERY_MESSAGE)),
        }
    }
}
