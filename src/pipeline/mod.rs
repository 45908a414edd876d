// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod units;

pub use orchestrator::{DigestResult, SummarizationOrchestrator};
pub use progress::{PipelineStats, ProgressTracker};
pub use retry::RetryPolicy;
pub use runner::{Pipeline, RunReport, RunStatus, run};
pub use units::{WindowLimits, partition};
