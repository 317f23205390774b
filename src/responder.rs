use std::sync::Arc;

use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::error::ExpertError;
use crate::mode::Mode;
use crate::providers::{CompletionRequest, Provider};

/// Answers one message in the persona of the selected [`Mode`].
///
/// Stateless apart from the injected provider: every call builds a fresh
/// two-message conversation and makes exactly one provider call.
pub struct ExpertResponder {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for ExpertResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpertResponder")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ExpertResponder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// The conversation `respond` would send for these arguments.
    pub fn conversation(user_text: &str, mode: Mode) -> Conversation {
        Conversation::new(mode, user_text)
    }

    /// Send `user_text` under `mode`'s instruction and return the model's text.
    ///
    /// Empty input is not rejected here; that is the caller's job. Any
    /// provider failure comes back as [`ExpertError::Completion`].
    pub async fn respond(&self, user_text: &str, mode: Mode) -> Result<String, ExpertError> {
        let request_id = Uuid::now_v7();
        let span = info_span!("respond", %request_id, %mode);

        async {
            let conversation = Self::conversation(user_text, mode);
            let request = CompletionRequest {
                model: &self.model,
                temperature: self.temperature,
                messages: conversation.messages(),
            };
            debug!(provider = self.provider.name(), model = %self.model, "sending completion");

            self.provider
                .complete(request)
                .await
                .map_err(|e| ExpertError::Completion(e.to_string()))
        }
        .instrument(span)
        .await
    }
}
