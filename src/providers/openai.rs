use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CompletionRequest, Provider};
use crate::config::Config;
use crate::error::ExpertError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

// --- Wire format (private) ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat Completions client for OpenAI and compatible servers.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    /// Full endpoint URL (base + CHAT_COMPLETIONS_PATH).
    url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self, ExpertError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExpertError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            url: format!("{}{CHAT_COMPLETIONS_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ExpertError> {
        let api_key = SecretString::from(config.api_key.expose_secret().to_owned());
        Self::new(api_key, &config.base_url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ExpertError> {
        let body = ApiRequest {
            model: request.model,
            temperature: request.temperature,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role(),
                    content: m.content(),
                })
                .collect(),
        };
        debug!(url = %self.url, messages = body.messages.len(), "POST chat completion");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ExpertError::Provider(format!("request failed: {}", error_chain(&e))))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "chat completion returned non-success status");
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(ExpertError::Provider(format!("API returned {status}: {detail}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| {
                ExpertError::Provider(format!("failed to parse response: {}", error_chain(&e)))
            })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExpertError::Provider("response contained no message content".to_owned()))
    }
}

/// Render an error followed by each of its sources, `: `-separated.
/// reqwest keeps the useful cause (refused, DNS, TLS) a few levels down.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper(std::io::Error);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = Wrapper(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused",
        ));
        assert_eq!(error_chain(&err), "error sending request: Connection refused");
    }

    #[test]
    fn error_chain_skips_repeated_text() {
        let err = Wrapper(std::io::Error::new(
            std::io::ErrorKind::Other,
            "error sending request",
        ));
        assert_eq!(error_chain(&err), "error sending request");
    }

    #[test]
    fn endpoint_url_trims_trailing_slash() {
        let provider =
            OpenAiProvider::new(SecretString::from("sk-test".to_owned()), "http://localhost:1234/v1/").unwrap();
        assert_eq!(provider.url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn default_endpoint() {
        let provider = OpenAiProvider::new(SecretString::from("sk-test".to_owned()), DEFAULT_BASE_URL).unwrap();
        assert_eq!(provider.url(), "https://api.openai.com/v1/chat/completions");
    }
}
