// file: src/pipeline/orchestrator.rs
// description: concurrent, retrying, cached summarization of units and repository digests
// reference: orchestrates asynchronous summarization workflow

use crate::cache::{CacheKey, CachedCompletion, CompletionCache};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::llm::{CompletionError, CompletionProvider, CompletionRequest, PromptBuilder};
use crate::models::{
    FailureKind, SummarizationUnit, SummaryMap, SummaryResult, UnitId, UnitTracker,
};
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::retry::RetryPolicy;
use crate::utils::{flatten_prose, format_sentence, table_cell};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Repository-level prose produced after all units are done. `None` means the request
/// failed and the assembler falls back to templated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigestResult {
    pub intro: Option<String>,
    pub overview: Option<String>,
    pub digest_truncated: bool,
    pub failures: Vec<String>,
}

impl DigestResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

enum Completion {
    Text(String),
    Failed {
        kind: FailureKind,
        reason: String,
        attempts: u32,
    },
}

enum Attempt {
    Finished(std::result::Result<String, CompletionError>),
    Cancelled,
}

/// Per-call state shared by every worker of one `summarize_*` invocation.
struct RunContext {
    abort: CancellationToken,
    semaphore: Semaphore,
    auth_failure: Mutex<Option<String>>,
}

impl RunContext {
    fn new(parent: &CancellationToken, permits: usize) -> Self {
        Self {
            abort: parent.child_token(),
            semaphore: Semaphore::new(permits),
            auth_failure: Mutex::new(None),
        }
    }

    fn record_auth_failure(&self, reason: String) {
        if let Ok(mut slot) = self.auth_failure.lock()
            && slot.is_none()
        {
            *slot = Some(reason);
        }
        self.abort.cancel();
    }

    fn auth_failure(&self) -> Option<String> {
        self.auth_failure.lock().ok().and_then(|slot| slot.clone())
    }
}

pub struct SummarizationOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    cache: Arc<dyn CompletionCache>,
    prompts: PromptBuilder,
    policy: RetryPolicy,
    max_in_flight: usize,
    request_timeout: Duration,
    cancel_grace: Duration,
    cancel: CancellationToken,
    progress: Option<Arc<ProgressTracker>>,
}

impl SummarizationOrchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<dyn CompletionCache>,
        prompts: PromptBuilder,
        config: &PipelineConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            provider,
            cache,
            prompts,
            policy: RetryPolicy::from_config(config),
            max_in_flight: config.max_in_flight.max(1),
            request_timeout: config.request_timeout(),
            cancel_grace: config.cancel_grace(),
            cancel,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<ProgressTracker>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Summarizes every unit with at most `max_in_flight` requests outstanding. Results are
    /// keyed by unit identity, so completion order never affects the returned map.
    pub async fn summarize_units(&self, units: Vec<SummarizationUnit>) -> Result<SummaryMap> {
        info!(
            "Summarizing {} units with {} concurrent requests",
            units.len(),
            self.max_in_flight
        );
        let ctx = RunContext::new(&self.cancel, self.max_in_flight);

        let outcomes: Vec<Result<(UnitId, SummaryResult)>> = stream::iter(units)
            .map(|unit| self.summarize_unit(unit, &ctx))
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        if let Some(reason) = ctx.auth_failure() {
            return Err(PipelineError::ProviderAuth(reason));
        }
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut summaries = SummaryMap::new();
        for outcome in outcomes {
            let (id, result) = outcome?;
            if !summaries.insert(id.clone(), result) {
                warn!("Duplicate result for {} ignored", id);
            }
        }

        info!(
            "Summarized {} units ({} failed)",
            summaries.len(),
            summaries.failed().len()
        );
        Ok(summaries)
    }

    /// Produces the introduction and overview from the completed unit summaries. Individual
    /// failures degrade to `None`; authentication failure and cancellation abort.
    pub async fn summarize_repository_digest(&self, summaries: &SummaryMap) -> Result<DigestResult> {
        let entries: Vec<(String, String)> = summaries
            .iter()
            .filter_map(|(id, result)| {
                let label = if id.offset == 0 {
                    id.path.display().to_string()
                } else {
                    id.to_string()
                };
                result.text().map(|text| (label, text.to_string()))
            })
            .collect();

        let mut digest_result = DigestResult::default();
        if entries.is_empty() {
            warn!("No unit summaries available, skipping repository digest");
            digest_result
                .failures
                .push("no unit summaries available".to_string());
            return Ok(digest_result);
        }

        let digest = self.prompts.digest(&entries);
        digest_result.digest_truncated = digest.truncated;
        if digest.truncated {
            debug!("Repository digest truncated to token budget");
        }

        let ctx = RunContext::new(&self.cancel, 1);
        let intro_request = self.prompts.intro_request(&digest);
        let overview_request = self.prompts.overview_request(&digest);

        let intro = self.complete_with_retry("introduction", &intro_request, &ctx).await?;
        let overview = self.complete_with_retry("overview", &overview_request, &ctx).await?;

        if let Some(reason) = ctx.auth_failure() {
            return Err(PipelineError::ProviderAuth(reason));
        }
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        match intro {
            Completion::Text(text) => {
                let sentence = format_sentence(&table_cell(&text));
                if sentence.is_empty() {
                    digest_result
                        .failures
                        .push("introduction: empty after cleanup".to_string());
                } else {
                    digest_result.intro = Some(sentence);
                }
            }
            Completion::Failed { reason, .. } => {
                warn!("Introduction unavailable: {}", reason);
                digest_result.failures.push(format!("introduction: {}", reason));
            }
        }

        match overview {
            Completion::Text(text) => {
                let paragraph = flatten_prose(&text);
                if paragraph.is_empty() {
                    digest_result
                        .failures
                        .push("overview: empty after cleanup".to_string());
                } else {
                    digest_result.overview = Some(paragraph);
                }
            }
            Completion::Failed { reason, .. } => {
                warn!("Overview unavailable: {}", reason);
                digest_result.failures.push(format!("overview: {}", reason));
            }
        }

        Ok(digest_result)
    }

    async fn summarize_unit(
        &self,
        unit: SummarizationUnit,
        ctx: &RunContext,
    ) -> Result<(UnitId, SummaryResult)> {
        let id = unit.id.clone();

        if ctx.abort.is_cancelled() {
            debug!("{}: pending -> failed (cancelled before dispatch)", id);
            self.record_failure();
            return Ok((id, cancelled_result(0)));
        }

        let key = CacheKey::for_unit(self.provider.model(), self.prompts.fingerprint(), &unit);
        if let Some(hit) = self.cache.get(&key) {
            debug!("{}: cache hit", id);
            self.record_success(unit.len() as u64, true);
            return Ok((
                id,
                SummaryResult::Succeeded {
                    text: hit.text,
                    truncated: hit.truncated,
                    cached: true,
                },
            ));
        }

        let (request, truncated) = self.prompts.unit_request(&unit);
        if truncated {
            debug!("{}: prompt truncated to token budget", id);
        }

        let result = match self
            .complete_with_retry(&id.to_string(), &request, ctx)
            .await?
        {
            Completion::Text(text) => {
                let value = CachedCompletion::new(text.clone(), truncated, self.provider.model());
                if !self.cache.insert_if_absent(key, value) {
                    debug!("{}: cache entry already written by another worker", id);
                }
                self.record_success(unit.len() as u64, false);
                SummaryResult::Succeeded {
                    text,
                    truncated,
                    cached: false,
                }
            }
            Completion::Failed {
                kind,
                reason,
                attempts,
            } => {
                if kind != FailureKind::Cancelled {
                    warn!("Failed to summarize {}: {}", id, reason);
                }
                self.record_failure();
                SummaryResult::Failed {
                    kind,
                    reason,
                    attempts,
                }
            }
        };

        Ok((id, result))
    }

    /// Drives one request through the unit lifecycle until it succeeds, exhausts its
    /// attempts, is rejected or is cancelled.
    async fn complete_with_retry(
        &self,
        label: &str,
        request: &CompletionRequest,
        ctx: &RunContext,
    ) -> Result<Completion> {
        let mut tracker = UnitTracker::new(self.policy.max_attempts);

        if ctx.abort.is_cancelled() {
            tracker.fail()?;
            return Ok(Completion::Failed {
                kind: FailureKind::Cancelled,
                reason: "run cancelled".to_string(),
                attempts: 0,
            });
        }

        loop {
            let attempt = tracker.dispatch()?;
            debug!("{}: -> {} (attempt {})", label, tracker.state().state_name(), attempt);

            let outcome = self.attempt(request, ctx).await;
            let reason = match outcome {
                Attempt::Finished(Ok(text)) => {
                    tracker.succeed()?;
                    debug!("{}: -> {}", label, tracker.state().state_name());
                    return Ok(Completion::Text(text));
                }
                Attempt::Cancelled => {
                    tracker.fail()?;
                    debug!("{}: -> failed (cancelled in flight)", label);
                    return Ok(Completion::Failed {
                        kind: FailureKind::Cancelled,
                        reason: "run cancelled".to_string(),
                        attempts: tracker.attempts(),
                    });
                }
                Attempt::Finished(Err(CompletionError::Auth(reason))) => {
                    tracker.fail()?;
                    ctx.record_auth_failure(reason.clone());
                    return Ok(Completion::Failed {
                        kind: FailureKind::Rejected,
                        reason,
                        attempts: tracker.attempts(),
                    });
                }
                Attempt::Finished(Err(CompletionError::Fatal(reason))) => {
                    tracker.fail()?;
                    debug!("{}: -> failed (rejected)", label);
                    return Ok(Completion::Failed {
                        kind: FailureKind::Rejected,
                        reason,
                        attempts: tracker.attempts(),
                    });
                }
                Attempt::Finished(Err(CompletionError::Transient(reason))) => reason,
            };

            if !tracker.fail_transient()? {
                debug!("{}: -> failed (attempts exhausted)", label);
                return Ok(Completion::Failed {
                    kind: FailureKind::RetriesExhausted,
                    reason,
                    attempts: tracker.attempts(),
                });
            }

            let delay = self.policy.delay(attempt);
            debug!(
                "{}: -> {} after '{}', backing off {:?}",
                label,
                tracker.state().state_name(),
                reason,
                delay
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.abort.cancelled() => {
                    tracker.fail()?;
                    return Ok(Completion::Failed {
                        kind: FailureKind::Cancelled,
                        reason: "run cancelled during backoff".to_string(),
                        attempts: tracker.attempts(),
                    });
                }
            }
        }
    }

    /// One request under the per-request timeout. On cancellation an in-flight request
    /// gets the grace period to finish before it is abandoned.
    async fn attempt(&self, request: &CompletionRequest, ctx: &RunContext) -> Attempt {
        let Ok(_permit) = ctx.semaphore.acquire().await else {
            return Attempt::Cancelled;
        };
        if ctx.abort.is_cancelled() {
            return Attempt::Cancelled;
        }

        let call = tokio::time::timeout(self.request_timeout, self.provider.complete(request));
        tokio::pin!(call);

        let finished = tokio::select! {
            result = &mut call => result,
            _ = ctx.abort.cancelled() => {
                match tokio::time::timeout(self.cancel_grace, &mut call).await {
                    Ok(result) => result,
                    Err(_) => return Attempt::Cancelled,
                }
            }
        };

        match finished {
            Ok(result) => Attempt::Finished(result),
            Err(_) => Attempt::Finished(Err(CompletionError::Transient(format!(
                "request timed out after {:?}",
                self.request_timeout
            )))),
        }
    }

    fn record_success(&self, bytes: u64, cached: bool) {
        if let Some(progress) = &self.progress {
            progress.inc_succeeded(bytes, cached);
        }
    }

    fn record_failure(&self) {
        if let Some(progress) = &self.progress {
            progress.inc_failed();
        }
    }
}

fn cancelled_result(attempts: u32) -> SummaryResult {
    SummaryResult::Failed {
        kind: FailureKind::Cancelled,
        reason: "run cancelled".to_string(),
        attempts,
    }
}
