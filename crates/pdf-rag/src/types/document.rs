//! Retrieved passage types with source tracking for citations

use serde::{Deserialize, Serialize};

/// A passage returned by the similarity index, most relevant first.
///
/// The score stays inside the index client; nothing downstream orders by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    /// Full passage text
    pub passage_text: String,
    /// Path of the file the passage was chunked from
    pub source_path: String,
    /// Page locator, when the chunker recorded one
    pub page_number: Option<u32>,
}

impl RetrievalResult {
    /// Create a result without a page locator
    pub fn new(passage_text: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            passage_text: passage_text.into(),
            source_path: source_path.into(),
            page_number: None,
        }
    }

    /// Attach a page locator
    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Filename component of the source path
    pub fn document_name(&self) -> &str {
        self.source_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.source_path)
    }
}

/// Wire shape of a retrieved chunk: `{ pageContent, metadata: { source, loc: { pageNumber } } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub page_content: String,
    pub metadata: DocumentMetadata,
}

/// Chunk metadata as written by the ingestion worker
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// Position of a chunk inside its document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

impl From<&RetrievalResult> for SearchDocument {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            page_content: result.passage_text.clone(),
            metadata: DocumentMetadata {
                source: result.source_path.clone(),
                loc: result.page_number.map(|page| Location {
                    page_number: Some(page),
                }),
            },
        }
    }
}

impl From<SearchDocument> for RetrievalResult {
    fn from(doc: SearchDocument) -> Self {
        Self {
            passage_text: doc.page_content,
            source_path: doc.metadata.source,
            page_number: doc.metadata.loc.and_then(|loc| loc.page_number),
        }
    }
}
