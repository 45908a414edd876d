// file: src/llm/mod.rs
// description: completion service clients and prompt construction
// reference: internal module structure

pub mod groq;
pub mod offline;
pub mod prompts;
pub mod provider;
pub mod tokens;

pub use groq::GroqCompletionClient;
pub use offline::OfflineProvider;
pub use prompts::{Digest, PromptBuilder};
pub use provider::{CompletionError, CompletionProvider, CompletionRequest, PromptKind};
pub use tokens::{estimate_tokens, fitting_prefix_len, truncate_to_tokens};
