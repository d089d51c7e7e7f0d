//! Content chunking for breaking transcript documents into retrieval units.

mod splitter;

pub use splitter::TextSplitter;

use crate::config::ChunkingSettings;
use crate::error::Result;

/// Create a splitter from configuration.
pub fn create_splitter(settings: &ChunkingSettings) -> Result<TextSplitter> {
    TextSplitter::new(&settings.separator, settings.chunk_size, settings.chunk_overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_splitter_from_defaults() {
        let splitter = create_splitter(&ChunkingSettings::default()).unwrap();
        assert_eq!(splitter.chunk_size(), 500);
        assert_eq!(splitter.chunk_overlap(), 200);
    }
}
