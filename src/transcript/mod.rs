//! Transcript retrieval for YouTube videos.
//!
//! Turns a list of video links into one consolidated document of transcript text.
//! Failures are tolerated per link: a link that cannot be fetched produces a
//! warning and the remaining links are still processed.

mod youtube;

pub use youtube::YoutubeTranscripts;

use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One timed text segment of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Spoken text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of a video, trying `languages` in order.
    async fn fetch(&self, video_id: &str, languages: &[&str]) -> Result<Vec<TranscriptFragment>>;
}

/// Extract the video identifier from a link.
///
/// Takes whatever follows the last `v=` and stops at the first `&`. Links
/// without `v=` are returned as-is, so bare identifiers work too.
pub fn extract_video_id(link: &str) -> Option<String> {
    let after_v = link.trim().rsplit("v=").next()?;
    let id = after_v.split('&').next()?.trim();

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// A link that could not be turned into transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkWarning {
    /// The link as typed by the user.
    pub link: String,
    /// Why it failed.
    pub reason: String,
}

impl std::fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to process video {}: {}", self.link, self.reason)
    }
}

/// Result of fetching transcripts for a batch of links.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Concatenated transcript text, each fragment followed by a space.
    pub document: String,
    /// One entry per failing link, in link order.
    pub warnings: Vec<LinkWarning>,
    /// Number of links whose transcript was used.
    pub videos_ok: usize,
}

/// Fetches and consolidates transcripts for a list of links.
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    languages: Vec<String>,
}

impl TranscriptFetcher {
    /// Create a fetcher over `source` with the given language preference.
    pub fn new(source: Arc<dyn TranscriptSource>, languages: Vec<String>) -> Self {
        Self { source, languages }
    }

    /// Fetch every link and join all fragment texts into one document.
    ///
    /// Blank lines are skipped. Every other link either contributes its text
    /// or adds exactly one warning.
    #[instrument(skip(self, links), fields(count = links.len()))]
    pub async fn fetch_document(&self, links: &[String]) -> FetchOutcome {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        let mut outcome = FetchOutcome::default();

        for link in links.iter().filter(|l| !l.trim().is_empty()) {
            match self.fetch_one(link, &languages).await {
                Ok(fragments) => {
                    debug!("Fetched {} fragments for {}", fragments.len(), link);
                    for fragment in &fragments {
                        outcome.document.push_str(&fragment.text);
                        outcome.document.push(' ');
                    }
                    outcome.videos_ok += 1;
                }
                Err(e) => {
                    let warning = LinkWarning {
                        link: link.clone(),
                        reason: e.to_string(),
                    };
                    warn!("{}", warning);
                    outcome.warnings.push(warning);
                }
            }
        }

        info!(
            "Fetched {} of {} videos ({} characters)",
            outcome.videos_ok,
            outcome.videos_ok + outcome.warnings.len(),
            outcome.document.chars().count()
        );

        outcome
    }

    async fn fetch_one(&self, link: &str, languages: &[&str]) -> Result<Vec<TranscriptFragment>> {
        let video_id = extract_video_id(link).ok_or_else(|| {
            TubechatError::InvalidInput(format!("No video ID in link: {}", link))
        })?;

        let fragments = self.source.fetch(&video_id, languages).await?;
        if fragments.is_empty() {
            return Err(TubechatError::Transcript(format!(
                "Transcript for {} is empty",
                video_id
            )));
        }

        Ok(fragments)
    }
}

/// Split user input into links, one per line.
pub fn parse_links(input: &str) -> Vec<String> {
    input.lines().map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Transcript source backed by a fixed map of video IDs.
    struct StaticSource {
        videos: HashMap<String, Vec<TranscriptFragment>>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl StaticSource {
        fn new(videos: &[(&str, &[&str])]) -> Self {
            let videos = videos
                .iter()
                .map(|(id, texts)| {
                    let fragments = texts
                        .iter()
                        .enumerate()
                        .map(|(i, t)| TranscriptFragment::new(*t, i as f64, 1.0))
                        .collect();
                    (id.to_string(), fragments)
                })
                .collect();
            Self {
                videos,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for StaticSource {
        async fn fetch(&self, video_id: &str, languages: &[&str]) -> Result<Vec<TranscriptFragment>> {
            self.calls.lock().unwrap().push((
                video_id.to_string(),
                languages.iter().map(|l| l.to_string()).collect(),
            ));
            self.videos
                .get(video_id)
                .cloned()
                .ok_or_else(|| TubechatError::Transcript(format!("No transcript for {}", video_id)))
        }
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=ABC123&t=5"),
            Some("ABC123".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("  https://youtube.com/watch?v=xyz  "),
            Some("xyz".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(extract_video_id("https://youtube.com/watch?v="), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_extract_video_id_uses_last_v_param() {
        assert_eq!(
            extract_video_id("https://example.com/?v=first&next=https://youtube.com/watch?v=second"),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_good_links() {
        let source = Arc::new(StaticSource::new(&[("good", &["hello", "world"])]));
        let fetcher = TranscriptFetcher::new(source, vec!["pt".into(), "en".into()]);

        let outcome = fetcher
            .fetch_document(&links(&[
                "https://www.youtube.com/watch?v=good",
                "https://www.youtube.com/watch?v=missing",
            ]))
            .await;

        assert_eq!(outcome.document, "hello world ");
        assert_eq!(outcome.videos_ok, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].link, "https://www.youtube.com/watch?v=missing");
        assert!(outcome.warnings[0].to_string().contains("watch?v=missing"));
    }

    #[tokio::test]
    async fn test_document_follows_link_order_and_languages() {
        let source = Arc::new(StaticSource::new(&[("a", &["alpha"]), ("b", &["beta"])]));
        let fetcher = TranscriptFetcher::new(source.clone(), vec!["pt".into(), "en".into()]);

        let outcome = fetcher
            .fetch_document(&links(&["watch?v=b", "", "watch?v=a", "watch?v=b"]))
            .await;

        assert_eq!(outcome.document, "beta alpha beta ");
        assert_eq!(outcome.videos_ok, 3);
        assert!(outcome.warnings.is_empty());

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, langs)| langs == &["pt", "en"]));
    }

    #[tokio::test]
    async fn test_all_links_fail_gives_empty_document() {
        let source = Arc::new(StaticSource::new(&[]));
        let fetcher = TranscriptFetcher::new(source, vec!["en".into()]);

        let outcome = fetcher.fetch_document(&links(&["watch?v=x", "watch?v="])).await;

        assert!(outcome.document.is_empty());
        assert_eq!(outcome.videos_ok, 0);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_a_warning() {
        let source = Arc::new(StaticSource::new(&[("silent", &[])]));
        let fetcher = TranscriptFetcher::new(source, vec!["en".into()]);

        let outcome = fetcher.fetch_document(&links(&["watch?v=silent"])).await;

        assert_eq!(outcome.videos_ok, 0);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_parse_links() {
        assert_eq!(parse_links("a\nb\r\n\nc"), vec!["a", "b", "", "c"]);
        assert!(parse_links("").is_empty());
    }
}
