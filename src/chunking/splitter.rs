//! Separator-based text splitting with overlap.

use crate::error::{Result, TubechatError};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Splits text on a separator and merges the pieces into overlapping chunks.
///
/// Lengths are counted in characters, not bytes. A chunk never exceeds
/// `chunk_size` unless a single piece is already longer than that.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a new splitter.
    pub fn new(separator: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(TubechatError::Chunking("chunk_size must be positive".to_string()));
        }
        if chunk_overlap > chunk_size {
            return Err(TubechatError::Chunking(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            separator: separator.to_string(),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect()
        };

        let chunks = self.merge(&pieces);
        debug!("Split {} pieces into {} chunks", pieces.len(), chunks.len());
        chunks
    }

    fn merge<'a>(&self, pieces: &[&'a str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<&'a str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = piece.chars().count();
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }

                if !window.is_empty() {
                    if let Some(chunk) = self.join(&window) {
                        chunks.push(chunk);
                    }

                    // Keep only the tail that fits the overlap and leaves room for `piece`
                    loop {
                        let joiner = if window.is_empty() { 0 } else { sep_len };
                        let must_shrink = total > self.chunk_overlap
                            || (total + len + joiner > self.chunk_size && total > 0);
                        if !must_shrink {
                            break;
                        }
                        let Some(front) = window.pop_front() else {
                            break;
                        };
                        let front_sep = if window.is_empty() { 0 } else { sep_len };
                        total = total.saturating_sub(front.chars().count() + front_sep);
                    }
                }
            }

            window.push_back(piece);
            total += len + if window.len() > 1 { sep_len } else { 0 };
        }

        if let Some(chunk) = self.join(&window) {
            chunks.push(chunk);
        }

        chunks
    }

    fn join(&self, window: &VecDeque<&str>) -> Option<String> {
        let joined = window
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
