// file: src/llm/offline.rs
// description: provider used in offline mode; never touches the network

use crate::llm::provider::{CompletionError, CompletionProvider, CompletionRequest};
use async_trait::async_trait;

/// Rejects every request so the document falls back to placeholders and templated prose.
#[derive(Debug, Default)]
pub struct OfflineProvider;

#[async_trait]
impl CompletionProvider for OfflineProvider {
    fn model(&self) -> &str {
        "offline"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Fatal(format!(
            "offline mode: {} not generated",
            request.kind.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::PromptKind;

    #[tokio::test]
    async fn test_offline_rejects_fatally() {
        let request = CompletionRequest {
            kind: PromptKind::Overview,
            system: String::new(),
            prompt: "digest".to_string(),
            max_tokens: 10,
        };
        let err = OfflineProvider.complete(&request).await.unwrap_err();
        assert!(!err.is_transient());
    }
}
