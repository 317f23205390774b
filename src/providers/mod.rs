pub mod openai;

use async_trait::async_trait;

use crate::error::ExpertError;

/// Messages sent from the responder to an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Instruction { content: String },
    User { content: String },
}

impl Message {
    /// Chat-completion wire role.
    pub fn role(&self) -> &'static str {
        match self {
            Message::Instruction { .. } => "system",
            Message::User { .. } => "user",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Instruction { content } | Message::User { content } => content,
        }
    }
}

/// Everything a provider needs for one completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: &'a [Message],
}

/// Extension point for LLM inference backends. The responder only sees this
/// trait, never a provider's wire format.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the text content of the completion.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ExpertError>;
}
