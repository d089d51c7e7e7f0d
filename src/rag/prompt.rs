//! Prompt assembly from retrieved chunks.

use crate::config::Prompts;
use crate::vector_store::SearchResult;
use std::collections::HashMap;

/// Number the chunks from 1, one per paragraph.
pub fn format_chunks(chunks: &[SearchResult]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{}. {}\n", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the retrieval prompt for `question` from the configured template.
pub fn assemble_prompt(prompts: &Prompts, chunks: &[SearchResult], question: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("chunks".to_string(), format_chunks(chunks));
    vars.insert("question".to_string(), question.to_string());

    prompts.render_with_custom(&prompts.rag.template, &vars)
}
