//! Client configuration for OpenAI-compatible chat APIs.

use crate::config::ChatSettings;
use crate::error::{Result, TubechatError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the hosted chat model described by `settings`.
///
/// The API key is read from the environment variable named in the settings.
pub fn create_chat_client(settings: &ChatSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
        TubechatError::Config(format!("{} not set", settings.api_key_env))
    })?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(api_key);

    build_client(config, Duration::from_secs(settings.timeout_seconds))
}

fn build_client(config: OpenAIConfig, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_the_variable() {
        let settings = ChatSettings {
            api_key_env: "TUBECHAT_CLIENT_KEY_UNSET".to_string(),
            ..ChatSettings::default()
        };
        let err = create_chat_client(&settings).err().unwrap();
        assert!(err.to_string().contains("TUBECHAT_CLIENT_KEY_UNSET not set"));
    }
}
