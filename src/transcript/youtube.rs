//! YouTube transcript source.

use super::{TranscriptFragment, TranscriptSource};
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Transcript source backed by YouTube's caption tracks.
pub struct YoutubeTranscripts {
    api: YouTubeTranscriptApi,
    preserve_formatting: bool,
}

impl YoutubeTranscripts {
    pub fn new(preserve_formatting: bool) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            TubechatError::Transcript(format!("Failed to create transcript client: {}", e))
        })?;

        Ok(Self {
            api,
            preserve_formatting,
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscripts {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str, languages: &[&str]) -> Result<Vec<TranscriptFragment>> {
        let transcript = self
            .api
            .fetch_transcript(video_id, languages, self.preserve_formatting)
            .await
            .map_err(|e| TubechatError::Transcript(format!("Failed to fetch transcript: {}", e)))?;

        debug!(
            "Transcript for {} in {} ({} snippets)",
            video_id,
            transcript.language_code,
            transcript.snippets.len()
        );

        Ok(transcript
            .snippets
            .into_iter()
            .map(|s| TranscriptFragment::new(s.text, s.start, s.duration))
            .collect())
    }
}
