//! Session state and the two user actions: processing videos and asking questions.
//!
//! A [`Session`] holds everything that lives for one interactive session: the
//! conversation shown to the user and the vector index of the last processed
//! videos. The [`Assistant`] owns the collaborators and runs each action
//! against a session to completion.

use crate::chunking::{create_splitter, TextSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, TubechatError};
use crate::rag::{assemble_prompt, ChatModel, HostedChat, Message};
use crate::transcript::{LinkWarning, TranscriptFetcher, TranscriptSource, YoutubeTranscripts};
use crate::vector_store::{Metric, VectorIndex};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ordered chat history as displayed to the user.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all messages and start over with a single assistant greeting.
    pub fn reset_with_greeting(&mut self, greeting: &str) {
        self.messages.clear();
        self.messages.push(Message::assistant(greeting));
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

}

/// State of one interactive session.
#[derive(Default)]
pub struct Session {
    conversation: Conversation,
    index: Option<VectorIndex>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Whether questions can be asked (an index exists).
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }
}

/// Outcome of processing a batch of video links.
#[derive(Debug, Clone)]
pub struct ProcessReport {
    /// Links whose transcript was used.
    pub videos_ok: usize,
    /// Chunks in the new index (0 when nothing could be indexed).
    pub chunks_indexed: usize,
    /// Links that failed, with reasons.
    pub warnings: Vec<LinkWarning>,
}

/// Runs the session actions with a fixed set of collaborators.
pub struct Assistant {
    fetcher: TranscriptFetcher,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    prompts: Prompts,
    top_k: usize,
    metric: Metric,
}

impl Assistant {
    /// Create an assistant with the production collaborators.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source: Arc<dyn TranscriptSource> =
            Arc::new(YoutubeTranscripts::new(settings.transcript.preserve_formatting)?);

        info!(
            "Using embedding model {} and chat model {}",
            settings.embedding.model, settings.chat.model
        );
        let embedder = create_embedder(&settings.embedding)?;
        let chat: Arc<dyn ChatModel> = Arc::new(HostedChat::new(&settings.chat)?);

        Self::with_components(settings, prompts, source, embedder, chat)
    }

    /// Create an assistant with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let metric: Metric = settings
            .retrieval
            .metric
            .parse()
            .map_err(TubechatError::Config)?;

        if settings.retrieval.top_k == 0 {
            return Err(TubechatError::Config("retrieval.top_k must be positive".to_string()));
        }

        Ok(Self {
            fetcher: TranscriptFetcher::new(source, settings.transcript.languages.clone()),
            splitter: create_splitter(&settings.chunking)?,
            embedder,
            chat,
            prompts,
            top_k: settings.retrieval.top_k,
            metric,
        })
    }

    /// Fetch transcripts for `links`, index them and reset the conversation.
    ///
    /// Per-link failures end up in the report. If no text could be indexed the
    /// previous index and conversation are dropped and questions stay disabled.
    /// Embedding errors propagate and leave the session untouched.
    #[instrument(skip(self, session, links), fields(links = links.len()))]
    pub async fn process_videos(&self, session: &mut Session, links: &[String]) -> Result<ProcessReport> {
        let outcome = self.fetcher.fetch_document(links).await;

        let chunks = self.splitter.split_text(&outcome.document);
        info!("Split document into {} chunks", chunks.len());

        if chunks.is_empty() {
            warn!("No transcript text to index");
            session.index = None;
            session.conversation.clear();
            return Ok(ProcessReport {
                videos_ok: outcome.videos_ok,
                chunks_indexed: 0,
                warnings: outcome.warnings,
            });
        }

        let index = VectorIndex::build(chunks, self.embedder.as_ref(), self.metric).await?;
        let chunks_indexed = index.len();

        session.index = Some(index);
        session.conversation.reset_with_greeting(&self.prompts.rag.greeting);

        Ok(ProcessReport {
            videos_ok: outcome.videos_ok,
            chunks_indexed,
            warnings: outcome.warnings,
        })
    }

    /// Answer `question` from the indexed videos and the conversation so far.
    ///
    /// The model sees the history with the retrieval prompt as the last user
    /// turn. Afterwards the prompt is replaced by the raw question and the
    /// answer is appended. Blank questions are ignored and return `None`.
    #[instrument(skip(self, session), fields(question = %question))]
    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<Option<String>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        let index = session.index.as_ref().ok_or(TubechatError::NotReady)?;

        let query_embedding = self.embedder.embed(question).await?;
        let relevant = index.search(&query_embedding, self.top_k)?;
        debug!("Retrieved {} chunks", relevant.len());

        let prompt = assemble_prompt(&self.prompts, &relevant, question);

        session.conversation.push(Message::user(prompt));
        let result = self.chat.complete(session.conversation.messages()).await;
        session.conversation.pop();
        let answer = result?;

        session.conversation.push(Message::user(question));
        session.conversation.push(Message::assistant(answer.clone()));

        Ok(Some(answer))
    }

    pub fn greeting(&self) -> &str {
        &self.prompts.rag.greeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::Role;
    use crate::transcript::TranscriptFragment;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OneVideo;

    #[async_trait]
    impl TranscriptSource for OneVideo {
        async fn fetch(&self, video_id: &str, _languages: &[&str]) -> Result<Vec<TranscriptFragment>> {
            match video_id {
                "talk" => Ok(vec![
                    TranscriptFragment::new("rust ownership explained", 0.0, 2.0),
                    TranscriptFragment::new("borrowing rules", 2.0, 2.0),
                ]),
                _ => Err(TubechatError::Transcript("Transcripts are disabled".to_string())),
            }
        }
    }

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(TubechatError::Embedding("model unavailable".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(TubechatError::Embedding("model unavailable".to_string()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Records every history it is called with.
    #[derive(Default)]
    struct RecordingChat {
        seen: Mutex<Vec<Vec<Message>>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, messages: &[Message]) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(TubechatError::OpenAI("rate limited".to_string()));
            }
            Ok(format!("answer #{}", self.seen.lock().unwrap().len()))
        }
    }

    fn assistant(embedder: Arc<dyn Embedder>, chat: Arc<RecordingChat>) -> Assistant {
        Assistant::with_components(
            &Settings::default(),
            Prompts::default(),
            Arc::new(OneVideo),
            embedder,
            chat,
        )
        .unwrap()
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_conversation_reset() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("old"));
        conversation.reset_with_greeting("hi");
        assert_eq!(conversation.messages(), &[Message::assistant("hi")]);
    }

    #[tokio::test]
    async fn test_process_seeds_greeting_and_replaces_history() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(LengthEmbedder), chat);
        let mut session = Session::new();

        let report = assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();
        assert_eq!(report.chunks_indexed, 1);
        assert!(session.is_ready());

        assistant.ask(&mut session, "what?").await.unwrap();
        assert_eq!(session.messages().len(), 3);

        assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_model_sees_prompt_history_keeps_question() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(LengthEmbedder), chat.clone());
        let mut session = Session::new();
        assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();

        assistant.ask(&mut session, "First?").await.unwrap();
        assistant.ask(&mut session, "Second?").await.unwrap();

        let seen = chat.seen.lock().unwrap();
        // Second call: greeting, clean first question, first answer, full prompt
        let second = &seen[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[1], Message::user("First?"));
        assert_eq!(second[2], Message::assistant("answer #1"));
        assert!(second[3].content.contains("1. rust ownership explained borrowing rules"));
        assert!(second[3].content.contains("Second?"));

        let history = session.messages();
        assert_eq!(history.len(), 5);
        assert!(history.iter().all(|m| !m.content.contains("### Excerpts")));
    }

    #[tokio::test]
    async fn test_blank_question_is_noop() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(LengthEmbedder), chat.clone());
        let mut session = Session::new();
        assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();

        assert_eq!(assistant.ask(&mut session, "").await.unwrap(), None);
        assert_eq!(assistant.ask(&mut session, "   ").await.unwrap(), None);
        assert_eq!(session.messages().len(), 1);
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_before_processing_is_not_ready() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(LengthEmbedder), chat);
        let mut session = Session::new();

        let err = assistant.ask(&mut session, "hello?").await.unwrap_err();
        assert!(matches!(err, TubechatError::NotReady));
    }

    #[tokio::test]
    async fn test_no_transcripts_disables_questions() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(LengthEmbedder), chat);
        let mut session = Session::new();
        assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();

        let report = assistant
            .process_videos(&mut session, &links(&["watch?v=gone"]))
            .await
            .unwrap();

        assert_eq!(report.chunks_indexed, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(!session.is_ready());
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_propagates_without_leaking_prompt() {
        let chat = Arc::new(RecordingChat {
            fail: true,
            ..RecordingChat::default()
        });
        let assistant = assistant(Arc::new(LengthEmbedder), chat);
        let mut session = Session::new();
        assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap();

        let err = assistant.ask(&mut session, "Anything?").await.unwrap_err();
        assert!(matches!(err, TubechatError::OpenAI(_)));
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_session_untouched() {
        let chat = Arc::new(RecordingChat::default());
        let assistant = assistant(Arc::new(FailingEmbedder), chat);
        let mut session = Session::new();

        let err = assistant
            .process_videos(&mut session, &links(&["watch?v=talk"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TubechatError::Embedding(_)));
        assert!(!session.is_ready());
    }

    #[test]
    fn test_invalid_retrieval_settings() {
        let mut settings = Settings::default();
        settings.retrieval.metric = "hamming".to_string();
        let result = Assistant::with_components(
            &settings,
            Prompts::default(),
            Arc::new(OneVideo),
            Arc::new(LengthEmbedder),
            Arc::new(RecordingChat::default()),
        );
        assert!(matches!(result, Err(TubechatError::Config(_))));
    }
}
