//! Configuration module for tubechat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChatSettings, ChunkingSettings, EmbeddingSettings, PromptSettings, RetrievalSettings,
    ServerSettings, Settings, TranscriptSettings,
};
