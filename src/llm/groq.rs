// file: src/llm/groq.rs
// description: Groq (OpenAI-compatible) chat completions client
// reference: https://console.groq.com/docs/api-reference#chat

use crate::config::LlmConfig;
use crate::error::Result as PipelineResult;
use crate::llm::provider::{CompletionError, CompletionProvider, CompletionRequest};
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqCompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqCompletionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url("https://api.groq.com/openai/v1", api_key, model, 0.2)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> PipelineResult<Self> {
        Validator::validate_api_key(config.api_key.as_deref())?;
        Validator::validate_url(&config.base_url)?;
        Ok(Self::with_base_url(
            &config.base_url,
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
            config.temperature,
        ))
    }
}

#[async_trait]
impl CompletionProvider for GroqCompletionClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Requesting {} completion for {} chars",
            request.kind.as_str(),
            request.prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    CompletionError::Fatal(format!("Failed to build request: {}", e))
                } else {
                    CompletionError::Transient(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::from_status(status.as_u16(), &error_text));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            CompletionError::Fatal(format!("Failed to parse completion response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CompletionError::Fatal("No completion returned".to_string()))?;

        debug!("Received completion of {} chars", content.len());
        Ok(content)
    }
}
