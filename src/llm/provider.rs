// file: src/llm/provider.rs
// description: completion service contract shared by real clients and test doubles
// reference: https://docs.rs/async-trait

use crate::error::PipelineError;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    UnitSummary,
    Introduction,
    Overview,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::UnitSummary => "unit_summary",
            PromptKind::Introduction => "introduction",
            PromptKind::Overview => "overview",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub kind: PromptKind,
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// Rate limits, timeouts, 5xx responses. Worth retrying.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Content policy, malformed input and other permanent rejections.
    #[error("provider rejected request: {0}")]
    Fatal(String),

    /// Bad or missing credential. No request can succeed.
    #[error("provider authentication failed: {0}")]
    Auth(String),
}

impl CompletionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CompletionError::Transient(_))
    }

    /// Maps an HTTP status and response body to an error category.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("status {}: {}", status, body);
        match status {
            401 | 403 => CompletionError::Auth(message),
            408 | 409 | 425 | 429 => CompletionError::Transient(message),
            500..=599 => CompletionError::Transient(message),
            _ => CompletionError::Fatal(message),
        }
    }
}

impl From<CompletionError> for PipelineError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Transient(msg) => PipelineError::ProviderTransient(msg),
            CompletionError::Fatal(msg) => PipelineError::ProviderFatal(msg),
            CompletionError::Auth(msg) => PipelineError::ProviderAuth(msg),
        }
    }
}

/// A text-completion service. The orchestrator is its only caller and owns timeouts,
/// retries and caching; implementations make exactly one attempt per call.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            CompletionError::from_status(401, "bad key"),
            CompletionError::Auth(_)
        ));
        assert!(CompletionError::from_status(429, "slow down").is_transient());
        assert!(CompletionError::from_status(503, "").is_transient());
        assert!(matches!(
            CompletionError::from_status(400, "content_policy_violation"),
            CompletionError::Fatal(_)
        ));
    }

    #[test]
    fn test_into_pipeline_error() {
        let err: PipelineError = CompletionError::Auth("nope".into()).into();
        assert!(err.is_fatal());
        let err: PipelineError = CompletionError::Fatal("policy".into()).into();
        assert!(!err.is_fatal());
    }
}
