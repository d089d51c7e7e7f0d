//! Error types for tubechat.

use thiserror::Error;

/// Library-level error type for tubechat operations.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Chat model error: {0}")]
    Chat(String),

    #[error("No videos have been processed yet. Process at least one video with a transcript first.")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;
