//! In-memory vector index over transcript chunks.
//!
//! The index lives for one session and is rebuilt from scratch every time
//! videos are processed.

mod memory;

pub use memory::VectorIndex;

use serde::{Deserialize, Serialize};

/// Distance metric used to rank chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Squared Euclidean distance, lower is better.
    #[default]
    L2,
    /// Cosine similarity, higher is better.
    Cosine,
}

impl Metric {
    /// Score `a` against `b` under this metric.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => squared_l2_distance(a, b),
            Metric::Cosine => cosine_similarity(a, b),
        }
    }

    /// Whether score `a` ranks ahead of score `b`.
    pub fn compare(&self, a: f32, b: f32) -> std::cmp::Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal);
        match self {
            Metric::L2 => ord,
            Metric::Cosine => ord.reverse(),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Metric::L2),
            "cosine" => Ok(Metric::Cosine),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

/// A retrieved chunk with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Chunk text.
    pub content: String,
    /// Position of the chunk in the document.
    pub chunk_order: usize,
    /// Distance or similarity, depending on the metric.
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Compute squared Euclidean distance between two vectors.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
