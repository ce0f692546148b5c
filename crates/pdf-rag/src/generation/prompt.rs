//! Prompt templates for PDF question answering

use crate::error::Result;
use crate::types::{RetrievalResult, SearchDocument};

use super::citation::truncate_snippet;

/// Passages shorter than this after trimming are dropped instead of included
const MIN_TRUNCATED_PASSAGE: usize = 200;

const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant.
Use ONLY the following context from a PDF to answer the user's question. Do not use outside knowledge.
Answer in at least 50 words.";

const EMPTY_CONTEXT_NOTE: &str = "No passages from the PDF matched this question. \
Tell the user that the document does not appear to contain this information.";

/// Prompt text plus what the context budget let through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Full prompt sent to the generation model
    pub text: String,
    /// Passages serialized into the context (the last one possibly trimmed)
    pub passages_included: usize,
    /// Whether the budget cut or dropped any passage
    pub truncated: bool,
}

/// Prompt builder with a character budget on the serialized context
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_context_chars: usize,
}

impl PromptBuilder {
    /// `max_context_chars == 0` disables the budget
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Build the prompt for `question` over `results` (relevance order)
    pub fn build(&self, question: &str, results: &[RetrievalResult]) -> Result<AssembledPrompt> {
        if results.is_empty() {
            return Ok(AssembledPrompt {
                text: format!(
                    "{}\n\nContext: []\n\n{}\n\nUser Question: {}\n",
                    SYSTEM_INSTRUCTION, EMPTY_CONTEXT_NOTE, question
                ),
                passages_included: 0,
                truncated: false,
            });
        }

        let (documents, truncated) = self.fit_context(results)?;
        let mut context = serde_json::to_string_pretty(&documents)?;
        if truncated {
            context.push_str(&format!(
                "\n[context truncated: {} of {} passages included]",
                documents.len(),
                results.len()
            ));
        }

        Ok(AssembledPrompt {
            text: format!(
                "{}\n\nContext: {}\n\nUser Question: {}\n",
                SYSTEM_INSTRUCTION, context, question
            ),
            passages_included: documents.len(),
            truncated,
        })
    }

    /// Select the passages that fit the budget, trimming the one that crosses it
    fn fit_context(&self, results: &[RetrievalResult]) -> Result<(Vec<SearchDocument>, bool)> {
        let documents: Vec<SearchDocument> = results.iter().map(SearchDocument::from).collect();
        if self.max_context_chars == 0 {
            return Ok((documents, false));
        }

        let mut used = 0;
        let mut included = Vec::with_capacity(documents.len());

        for mut doc in documents {
            let rendered = serde_json::to_string_pretty(&doc)?.chars().count();
            if used + rendered <= self.max_context_chars {
                used += rendered;
                included.push(doc);
                continue;
            }

            // Budget left for passage text once the metadata wrapper is paid for
            let wrapper = rendered - doc.page_content.chars().count();
            let remaining = self.max_context_chars.saturating_sub(used + wrapper);
            if remaining >= MIN_TRUNCATED_PASSAGE {
                doc.page_content = truncate_snippet(&doc.page_content, remaining.saturating_sub(3));
                included.push(doc);
            }
            return Ok((included, true));
        }

        Ok((included, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_chunk() -> RetrievalResult {
        RetrievalResult::new("Refunds within 30 days.", "/docs/policy.pdf").with_page(4)
    }

    #[test]
    fn test_prompt_contains_instruction_context_and_question() {
        let prompt = PromptBuilder::new(0)
            .build("What is the refund policy?", &[policy_chunk()])
            .unwrap();

        assert!(prompt.text.contains("at least 50 words"));
        assert!(prompt.text.contains("\"pageContent\": \"Refunds within 30 days.\""));
        assert!(prompt.text.contains("\"source\": \"/docs/policy.pdf\""));
        assert!(prompt.text.contains("\"pageNumber\": 4"));
        assert!(prompt.text.ends_with("User Question: What is the refund policy?\n"));
        assert_eq!(prompt.passages_included, 1);
        assert!(!prompt.truncated);
    }

    #[test]
    fn test_empty_context_is_explicit() {
        let prompt = PromptBuilder::new(12_000).build("Who wrote it?", &[]).unwrap();
        assert!(prompt.text.contains("Context: []"));
        assert!(prompt.text.contains("does not appear to contain"));
        assert_eq!(prompt.passages_included, 0);
    }

    #[test]
    fn test_budget_trims_crossing_passage_and_drops_rest() {
        let long = "word ".repeat(400);
        let results = vec![
            policy_chunk(),
            RetrievalResult::new(long.clone(), "/docs/terms.pdf").with_page(9),
            RetrievalResult::new(long, "/docs/extra.pdf"),
        ];

        let prompt = PromptBuilder::new(1_000).build("refunds?", &results).unwrap();
        assert!(prompt.truncated);
        assert_eq!(prompt.passages_included, 2);
        assert!(prompt.text.contains("terms.pdf"));
        assert!(!prompt.text.contains("extra.pdf"));
        assert!(prompt.text.contains("[context truncated: 2 of 3 passages included]"));
    }

    #[test]
    fn test_tiny_remainder_drops_passage() {
        let results = vec![
            policy_chunk(),
            RetrievalResult::new("x".repeat(5_000), "/docs/big.pdf"),
        ];
        let prompt = PromptBuilder::new(250).build("q", &results).unwrap();
        assert_eq!(prompt.passages_included, 1);
        assert!(prompt.truncated);
    }

    #[test]
    fn test_zero_budget_is_unbounded() {
        let results = vec![RetrievalResult::new("y".repeat(50_000), "/docs/huge.pdf")];
        let prompt = PromptBuilder::new(0).build("q", &results).unwrap();
        assert!(!prompt.truncated);
        assert!(prompt.text.len() > 50_000);
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let accented = "é".repeat(3_000);
        let results = vec![RetrievalResult::new(accented.clone(), "/docs/accents.pdf")];

        let prompt = PromptBuilder::new(4_000).build("q", &results).unwrap();
        assert!(!prompt.truncated);
        assert!(prompt.text.contains(&accented));
    }
}
