// file: tests/common/mod.rs
// description: scripted completion provider and repository fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use git_readme::{CompletionError, CompletionProvider, CompletionRequest, Config, PromptKind};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(CompletionError),
}

/// Answers unit prompts per file path, with optional per-path delays, and counts calls
/// and the peak number of unit requests in flight.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    overview: Option<String>,
    unit_calls: AtomicU32,
    digest_calls: AtomicU32,
    in_flight: AtomicU32,
    peak_in_flight: AtomicU32,
    calls_by_path: Mutex<HashMap<String, u32>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, path: &str, text: &str) -> Self {
        self.replies
            .insert(path.to_string(), Reply::Text(text.to_string()));
        self
    }

    pub fn fail(mut self, path: &str, error: CompletionError) -> Self {
        self.replies.insert(path.to_string(), Reply::Fail(error));
        self
    }

    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn overview(mut self, text: &str) -> Self {
        self.overview = Some(text.to_string());
        self
    }

    pub fn peak_in_flight(&self) -> u32 {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn unit_calls(&self) -> u32 {
        self.unit_calls.load(Ordering::SeqCst)
    }

    pub fn digest_calls(&self) -> u32 {
        self.digest_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, path: &str) -> u32 {
        self.calls_by_path
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

/// Recovers the file path from the `File: <path>` line of a unit prompt.
fn prompt_path(prompt: &str) -> Option<String> {
    let line = prompt.lines().find(|l| l.starts_with("File: "))?;
    let path = line.trim_start_matches("File: ");
    Some(path.split(" (bytes").next().unwrap_or(path).to_string())
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        match request.kind {
            PromptKind::Introduction => {
                self.digest_calls.fetch_add(1, Ordering::SeqCst);
                return Ok("Turns code into documentation.".to_string());
            }
            PromptKind::Overview => {
                self.digest_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(self
                    .overview
                    .clone()
                    .unwrap_or_else(|| "A small demo project.".to_string()));
            }
            PromptKind::UnitSummary => {}
        }

        self.unit_calls.fetch_add(1, Ordering::SeqCst);
        let path = prompt_path(&request.prompt).unwrap_or_default();
        *self
            .calls_by_path
            .lock()
            .unwrap()
            .entry(path.clone())
            .or_insert(0) += 1;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self.delays.get(&path).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.replies.get(&path) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail(err)) => Err(err.clone()),
            None => Ok(format!("Summarizes {}.", path)),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default_config();
    config.pipeline.show_progress = false;
    config.pipeline.backoff_base_ms = 1;
    config.pipeline.backoff_max_ms = 4;
    config.pipeline.cancel_grace_ms = 20;
    config.pipeline.request_timeout_secs = 5;
    config.cache.enabled = false;
    config
}

pub fn repository(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        write_file(dir.path(), path, content);
    }
    dir
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

pub fn two_file_repository() -> TempDir {
    repository(&[
        ("a.py", "def helper(x):\n    return x * 2\n"),
        ("b.py", "class Record:\n    name: str\n"),
    ])
}
