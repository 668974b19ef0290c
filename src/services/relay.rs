// src/services/relay.rs
use std::sync::Arc;

use tracing::{debug, warn};

use super::completion::{CompletionProvider, CompletionRequest, ProviderError};
use super::tone::{RandomTone, ToneSelector};

/// Forwards one user message to the completion provider under a per-request tone.
#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn CompletionProvider>,
    tone: Arc<dyn ToneSelector>,
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_tone(provider, Arc::new(RandomTone))
    }

    pub fn with_tone(provider: Arc<dyn CompletionProvider>, tone: Arc<dyn ToneSelector>) -> Self {
        Self { provider, tone }
    }

    /// Returns the first choice's text, trimmed.
    pub async fn reply(&self, message: &str) -> Result<String, ProviderError> {
        let tone = self.tone.pick();
        debug!(%tone, "selected system prompt");

        let request = CompletionRequest::for_tone(tone, message);
        let response = match self.provider.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(kind = e.kind(), "completion failed: {e}");
                return Err(e);
            }
        };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyChoices)?;

        let content = choice.message.content.ok_or_else(|| {
            ProviderError::MalformedResponse("completion choice has no message content".to_string())
        })?;

        Ok(content.trim().to_string())
    }
}
