//! Local embeddings with fastembed (ONNX Runtime, CPU).

use super::Embedder;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Embedder backed by a local sentence-transformers model.
///
/// `TextEmbedding::embed` takes `&mut self`, so the model sits behind a
/// `Mutex`. Inference runs on the blocking thread pool.
///
/// fastembed L2-normalizes the vectors it returns, so embeddings are always
/// unit length and L2 and cosine rank chunks the same way.
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    dimensions: usize,
}

impl FastEmbedder {
    /// Load the default model (all-MiniLM-L6-v2, 384 dimensions).
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2, 384)
    }

    /// Load a model by its Hugging Face name.
    pub fn from_model_name(name: &str) -> Result<Self> {
        let (model, dimensions) = match name {
            "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
                (EmbeddingModel::AllMiniLML6V2, 384)
            }
            "BAAI/bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            "nomic-ai/nomic-embed-text-v1.5" => (EmbeddingModel::NomicEmbedTextV15, 768),
            other => {
                return Err(TubechatError::Config(format!(
                    "Unsupported local embedding model: {}",
                    other
                )))
            }
        };
        Self::with_model(model, dimensions)
    }

    /// Load a specific model.
    pub fn with_model(model: EmbeddingModel, dimensions: usize) -> Result<Self> {
        info!("Loading embedding model {:?}", model);

        let options = InitOptions::new(model)
            .with_cache_dir(cache_dir())
            .with_show_download_progress(false);
        let embedding = TextEmbedding::try_new(options)
            .map_err(|e| TubechatError::Embedding(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            dimensions,
        })
    }
}

/// Model files are cached here between runs.
fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubechat")
        .join("models")
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| TubechatError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let input = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| TubechatError::Embedding("Embedding model lock poisoned".to_string()))?;
            model
                .embed(input, None)
                .map_err(|e| TubechatError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| TubechatError::Embedding(format!("Embedding task failed: {}", e)))??;

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
