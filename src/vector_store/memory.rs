//! Flat in-memory vector index.

use super::{Metric, SearchResult};
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use tracing::{debug, instrument};

struct Entry {
    content: String,
    embedding: Vec<f32>,
}

/// In-memory index of chunk embeddings, searched by brute force.
pub struct VectorIndex {
    entries: Vec<Entry>,
    metric: Metric,
    dimensions: usize,
}

impl VectorIndex {
    /// Embed all chunks and build an index over them.
    #[instrument(skip(chunks, embedder), fields(count = chunks.len()))]
    pub async fn build(chunks: Vec<String>, embedder: &dyn Embedder, metric: Metric) -> Result<Self> {
        let embeddings = embedder.embed_batch(&chunks).await?;
        Self::from_embeddings(chunks, embeddings, metric)
    }

    /// Build an index from precomputed embeddings.
    pub fn from_embeddings(
        chunks: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metric: Metric,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(TubechatError::VectorIndex(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(TubechatError::VectorIndex(format!(
                "Embedding {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimensions
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| Entry { content, embedding })
            .collect::<Vec<_>>();

        debug!("Indexed {} chunks ({} dimensions)", entries.len(), dimensions);

        Ok(Self {
            entries,
            metric,
            dimensions,
        })
    }

    /// Return the `limit` chunks closest to `query_embedding`, best first.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if !self.is_empty() && query_embedding.len() != self.dimensions {
            return Err(TubechatError::VectorIndex(format!(
                "Query has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .enumerate()
            .map(|(order, entry)| SearchResult {
                content: entry.content.clone(),
                chunk_order: order,
                score: self.metric.score(query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort keeps document order among equal scores
        results.sort_by(|a, b| self.metric.compare(a.score, b.score));
        results.truncate(limit);

        Ok(results)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
