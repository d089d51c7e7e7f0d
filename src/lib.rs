//! tubechat - Chat with YouTube videos
//!
//! Fetches the transcripts of YouTube videos, indexes them in memory and
//! answers questions about them with a hosted LLM.
//!
//! # Overview
//!
//! A session goes through two actions:
//! - Process videos: fetch transcripts, split them into overlapping chunks,
//!   embed the chunks and build a fresh vector index
//! - Ask: retrieve the closest chunks for a question and let the chat model
//!   answer from them and the conversation so far
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Video ID extraction and transcript retrieval
//! - `chunking` - Separator-based text splitting with overlap
//! - `embedding` - Local embedding generation (ONNX model via fastembed)
//! - `vector_store` - In-memory vector index
//! - `rag` - Prompt assembly and the chat model
//! - `session` - Conversation state and the session actions
//! - `cli` - Browser UI, terminal chat and one-shot commands
//!
//! # Example
//!
//! ```rust,no_run
//! use tubechat::config::Settings;
//! use tubechat::session::{Assistant, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let assistant = Assistant::new(&settings)?;
//!     let mut session = Session::new();
//!
//!     let links = vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()];
//!     let report = assistant.process_videos(&mut session, &links).await?;
//!     println!("Indexed {} chunks", report.chunks_indexed);
//!
//!     if let Some(answer) = assistant.ask(&mut session, "What is the main topic?").await? {
//!         println!("{}", answer);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, TubechatError};
