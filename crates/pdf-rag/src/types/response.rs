//! Response types for chat queries

use serde::{Deserialize, Serialize};

use super::document::{RetrievalResult, SearchDocument};

/// Answer text used when the generation service returns nothing
pub const NO_RESPONSE_FALLBACK: &str = "No response from AI.";

/// Citation pointing back to the passage that backs an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source filename (last path component)
    pub document_name: String,
    /// Page number, when known
    pub page_number: Option<u32>,
    /// Passage text
    pub excerpt: String,
}

impl Citation {
    /// Derive a citation from a retrieved passage
    pub fn from_result(result: &RetrievalResult) -> Self {
        Self {
            document_name: result.document_name().to_string(),
            page_number: result.page_number,
            excerpt: result.passage_text.clone(),
        }
    }

    /// Page label, `N/A` when the chunk carried no locator
    pub fn page_label(&self) -> String {
        self.page_number
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Format citation for display in the conversation
    pub fn display(&self) -> String {
        format!(
            "📄 {} (Page {}) → {}",
            self.document_name,
            self.page_label(),
            self.excerpt
        )
    }
}

/// Typed result of one answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer, or [`NO_RESPONSE_FALLBACK`]
    pub answer_text: String,
    /// One citation per retrieved passage, relevance order
    pub citations: Vec<Citation>,
}

impl QueryResponse {
    /// Shape a response, substituting the fallback for a missing or empty answer
    pub fn new(answer: Option<String>, results: &[RetrievalResult]) -> Self {
        let answer_text = answer
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());

        Self {
            answer_text,
            citations: results.iter().map(Citation::from_result).collect(),
        }
    }

    /// Citations rendered as display strings
    pub fn source_lines(&self) -> Vec<String> {
        self.citations.iter().map(Citation::display).collect()
    }
}

/// Generation payload as carried on the wire under `aiContent`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiContent {
    #[serde(default)]
    pub kwargs: Option<AiContentKwargs>,
}

/// Body of the generation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiContentKwargs {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

/// Model details attached to a generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl AiContent {
    /// Generated text, if any
    pub fn content(&self) -> Option<&str> {
        self.kwargs.as_ref().and_then(|k| k.content.as_deref())
    }
}

/// `200` body of `POST /chat`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub ai_content: Option<AiContent>,
    #[serde(default)]
    pub similarity_search_results: Option<Vec<SearchDocument>>,
}

impl ChatResponse {
    /// Derive the typed response the conversation displays
    pub fn into_query_response(self) -> QueryResponse {
        let answer = self
            .ai_content
            .as_ref()
            .and_then(AiContent::content)
            .map(str::to_string);

        let results: Vec<RetrievalResult> = self
            .similarity_search_results
            .unwrap_or_default()
            .into_iter()
            .map(RetrievalResult::from)
            .collect();

        QueryResponse::new(answer, &results)
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Whichever of `error`/`message` the server filled in
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
