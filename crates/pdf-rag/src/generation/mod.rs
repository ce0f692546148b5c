//! Prompt assembly for answer generation

pub mod citation;
pub mod prompt;

pub use citation::truncate_snippet;
pub use prompt::{AssembledPrompt, PromptBuilder};
