use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use llm::LLMProvider;
use thiserror::Error;

use stackdraw_core::AiSettings;

/// What a single completion call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Text(String),
    /// The model answered with nothing usable (safety block, empty body).
    Blocked { reason: Option<String> },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("build LLM: {0}")]
    Build(String),

    #[error("chat: {0}")]
    Call(String),
}

/// Text-completion seam. One prompt in, one complete response out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError>;

    /// Short description for logs, e.g. "google (gemini-2.5-flash)".
    fn describe(&self) -> String {
        "model".to_string()
    }
}

fn map_backend(provider: &str) -> Result<LLMBackend, ModelError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(ModelError::UnknownProvider(other.to_string())),
    }
}

/// [`ModelClient`] backed by the `llm` crate. Built once at startup.
pub struct LlmClient {
    llm: Box<dyn LLMProvider>,
    provider: String,
    model: String,
}

impl LlmClient {
    pub fn from_settings(settings: &AiSettings) -> Result<Self, ModelError> {
        let backend = map_backend(&settings.provider)?;

        let mut builder = LLMBuilder::new().backend(backend).model(&settings.model);

        if !settings.api_key.is_empty() {
            builder = builder.api_key(&settings.api_key);
        }

        let llm = builder.build().map_err(|e| ModelError::Build(e.to_string()))?;

        Ok(Self {
            llm,
            provider: settings.provider.clone(),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError> {
        let messages = vec![ChatMessage::user().content(prompt).build()];

        let response = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| ModelError::Call(e.to_string()))?;

        Ok(match response.text() {
            Some(text) if !text.trim().is_empty() => Completion::Text(text),
            Some(_) => Completion::Blocked {
                reason: Some("LLM returned empty text".to_string()),
            },
            None => Completion::Blocked {
                reason: Some("LLM returned no text".to_string()),
            },
        })
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.provider, self.model)
    }
}
