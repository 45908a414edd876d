// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod utils;

pub use cache::{CacheKey, CompletionCache, FileCache, MemoryCache};
pub use config::{
    CacheConfig, Config, DocumentConfig, LlmConfig, PipelineConfig, RepositoryConfig,
};
pub use document::{DocumentAssembler, to_markdown};
pub use error::{PipelineError, Result};
pub use exporter::{DocumentWriter, OutputFormat};
pub use llm::{
    CompletionError, CompletionProvider, CompletionRequest, GroqCompletionClient,
    OfflineProvider, PromptKind,
};
pub use models::{AssembledDocument, RepositoryTree, SectionKey, SummaryMap, SummaryResult};
pub use pipeline::{
    Pipeline, PipelineStats, ProgressTracker, RunReport, RunStatus, SummarizationOrchestrator,
    run,
};
pub use repository::{FileClassifier, RepositoryIngestor, RepositoryReference, RepositorySync};
pub use utils::{OperationTimer, PerformanceMetrics, Validator};
