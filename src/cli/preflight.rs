//! Pre-flight checks before expensive operations.
//!
//! Validates that the required credentials are available before fetching
//! transcripts and loading models, which would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TubechatError};

/// Run pre-flight checks for answering questions with the given settings.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    check_api_key(&settings.chat.api_key_env)
}

/// Check that an API key variable is set and non-empty.
fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(TubechatError::Config(format!(
            "{} is empty. Set it in your environment or in a .env file.",
            var
        ))),
        Err(_) => Err(TubechatError::Config(format!(
            "{} not set. Set it in your environment or in a .env file.",
            var
        ))),
    }
}
