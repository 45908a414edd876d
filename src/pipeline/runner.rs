// file: src/pipeline/runner.rs
// description: end-to-end run from repository reference to assembled document
// reference: orchestrates asynchronous summarization workflow

use crate::cache::{CompletionCache, FileCache, MemoryCache};
use crate::config::Config;
use crate::document::{AssemblyInput, DocumentAssembler};
use crate::error::{PipelineError, Result};
use crate::llm::{CompletionProvider, GroqCompletionClient, OfflineProvider, PromptBuilder};
use crate::models::{AssembledDocument, UnitId};
use crate::pipeline::orchestrator::SummarizationOrchestrator;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::pipeline::units::{WindowLimits, partition};
use crate::repository::{FileClassifier, RepositoryIngestor, RepositoryReference, RepositorySync};
use crate::utils::{OperationTimer, PerformanceMetrics};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Extra time after the cancel grace for the cache flush and working copy release.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// The document was produced but some units or digest requests failed.
    SuccessWithWarnings,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub document: AssembledDocument,
    pub stats: PipelineStats,
    pub failed_units: Vec<UnitId>,
    pub digest_failures: Vec<String>,
    pub metrics: Vec<PerformanceMetrics>,
    pub status: RunStatus,
}

pub struct Pipeline {
    config: Config,
    provider: Arc<dyn CompletionProvider>,
    cache: Arc<dyn CompletionCache>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<dyn CompletionCache>,
    ) -> Self {
        Self {
            config,
            provider,
            cache,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs under the configured deadline. Past the deadline the run is cancelled and
    /// winds down through the normal cancellation path before `Timeout` is returned.
    /// The working copy is released on every path.
    pub async fn run(&self, reference: &RepositoryReference) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!("Starting run {} for {}", run_id, reference);
        let deadline = self.config.pipeline.run_deadline();

        let execution = self.execute(run_id, reference);
        tokio::pin!(execution);

        match tokio::time::timeout(deadline, &mut execution).await {
            Ok(result) => {
                if let Err(e) = &result {
                    error!("Run {} failed: {}", run_id, e);
                }
                result
            }
            Err(_) => {
                error!("Run exceeded deadline of {:?}, cancelling", deadline);
                self.cancel.cancel();

                let wind_down = self.config.pipeline.cancel_grace() + SHUTDOWN_MARGIN;
                if tokio::time::timeout(wind_down, &mut execution).await.is_err() {
                    warn!("Run {} did not stop within {:?}, abandoning it", run_id, wind_down);
                }
                Err(PipelineError::Timeout(format!(
                    "run exceeded deadline of {}s",
                    deadline.as_secs()
                )))
            }
        }
    }

    async fn execute(&self, run_id: Uuid, reference: &RepositoryReference) -> Result<RunReport> {
        let mut metrics = Vec::new();

        let timer = OperationTimer::new("acquire repository");
        let sync = RepositorySync::new(self.config.repository.clone());
        let working_copy = sync.acquire(reference, &self.cancel).await?;
        timer.warn_if_slow(Duration::from_secs(120), &reference.to_string());
        timer.finish();

        let timer = OperationTimer::new("ingest repository");
        let tree = RepositoryIngestor::new(self.config.repository.clone())
            .ingest_blocking(
                working_copy.root().to_path_buf(),
                working_copy.name().to_string(),
            )
            .await?;
        metrics.push(timer.finish_with_count(tree.file_count()));

        let classification = FileClassifier::new().classify(&tree);
        info!(
            "Detected languages: {:?}, {} dependencies",
            classification.language_names(),
            classification.dependencies.len()
        );

        let limits = WindowLimits::new(
            self.config.pipeline.split_threshold_bytes,
            self.config.llm.max_input_tokens,
        );
        let units = partition(&tree, limits);
        let unit_count = units.len();

        let progress = Arc::new(ProgressTracker::with_options(
            unit_count,
            self.config.pipeline.show_progress,
            true,
        ));
        let orchestrator = SummarizationOrchestrator::new(
            self.provider.clone(),
            self.cache.clone(),
            PromptBuilder::new(tree.name.clone(), &self.config.llm),
            &self.config.pipeline,
            self.cancel.clone(),
        )
        .with_progress(progress.clone());

        let timer = OperationTimer::new("summarize units");
        let summaries = orchestrator.summarize_units(units).await;
        progress.finish();
        if summaries.is_ok() {
            let pruned = self.cache.prune_untouched();
            if pruned > 0 {
                info!("Dropped {} cached completions no longer in the repository", pruned);
            }
        }
        self.flush_cache().await;
        let summaries = summaries?;
        metrics.push(timer.finish_with_count(unit_count));

        let timer = OperationTimer::new("summarize repository");
        let digest = orchestrator.summarize_repository_digest(&summaries).await?;
        timer.finish();

        let source = reference.to_string();
        let document = DocumentAssembler::new(self.config.document.clone()).assemble(
            &AssemblyInput {
                tree: &tree,
                classification: &classification,
                summaries: &summaries,
                digest: &digest,
                source: &source,
            },
        )?;

        let mut stats = progress.get_stats();
        stats.files_scanned = tree.file_count();

        let failed_units: Vec<UnitId> = summaries.failed().into_iter().cloned().collect();
        let status = if failed_units.is_empty() && !digest.has_failures() {
            RunStatus::Success
        } else {
            warn!(
                "Completed with {} failed units and {} digest failures",
                failed_units.len(),
                digest.failures.len()
            );
            RunStatus::SuccessWithWarnings
        };

        drop(working_copy);
        info!(
            "Run {} finished: {} units, {} failed",
            run_id,
            unit_count,
            failed_units.len()
        );

        Ok(RunReport {
            run_id,
            document,
            stats,
            failed_units,
            digest_failures: digest.failures,
            metrics,
            status,
        })
    }

    async fn flush_cache(&self) {
        if let Err(e) = self.cache.flush().await {
            warn!("Failed to persist completion cache: {}", e);
        }
    }
}

/// Builds the provider and cache described by `config` and runs once.
pub async fn run(
    reference: &RepositoryReference,
    config: &Config,
    cancel: CancellationToken,
) -> Result<RunReport> {
    config.validate()?;

    let provider: Arc<dyn CompletionProvider> = if config.llm.offline {
        info!("Offline mode: no completion requests will be sent");
        Arc::new(OfflineProvider)
    } else {
        Arc::new(GroqCompletionClient::from_config(&config.llm)?)
    };

    let cache: Arc<dyn CompletionCache> = if config.cache.enabled {
        Arc::new(FileCache::open(&config.cache.path).await?)
    } else {
        Arc::new(MemoryCache::new())
    };

    Pipeline::new(config.clone(), provider, cache)
        .with_cancellation(cancel)
        .run(reference)
        .await
}
