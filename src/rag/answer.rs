//! Answer generation with a hosted chat-completion model.

use super::{Message, Role};
use crate::config::ChatSettings;
use crate::error::{Result, TubechatError};
use crate::openai::create_chat_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for chat models that answer from a message history.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce the next assistant message for `messages`.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Chat model behind an OpenAI-compatible API (Groq by default).
pub struct HostedChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HostedChat {
    /// Create a chat model from settings. Fails if the API key is not set.
    pub fn new(settings: &ChatSettings) -> Result<Self> {
        Ok(Self {
            client: create_chat_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| TubechatError::Chat(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| TubechatError::Chat(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl ChatModel for HostedChat {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    #[allow(deprecated)]
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| TubechatError::Chat(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubechatError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubechatError::Chat("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer of {} characters", answer.chars().count());

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = ChatSettings {
            api_key_env: "TUBECHAT_TEST_UNSET_KEY".to_string(),
            ..ChatSettings::default()
        };
        let err = HostedChat::new(&settings).err().unwrap();
        assert!(matches!(err, TubechatError::Config(_)));
        assert!(err.to_string().contains("TUBECHAT_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_messages_convert_by_role() {
        let user = to_request_message(&Message::user("q")).unwrap();
        let assistant = to_request_message(&Message::assistant("a")).unwrap();
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));
    }
}
