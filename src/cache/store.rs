// file: src/cache/store.rs
// description: content-addressed completion cache, in memory or persisted as JSON
// reference: https://docs.rs/sha2

use crate::error::{PipelineError, Result};
use crate::models::SummarizationUnit;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// SHA-256 over model, prompt fingerprint, unit path, unit offset and unit content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_unit(model: &str, fingerprint: &str, unit: &SummarizationUnit) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(fingerprint.as_bytes());
        hasher.update([0u8]);
        hasher.update(unit.id.path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(unit.id.offset.to_le_bytes());
        hasher.update(&unit.content);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCompletion {
    pub text: String,
    pub truncated: bool,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl CachedCompletion {
    pub fn new(text: String, truncated: bool, model: &str) -> Self {
        Self {
            text,
            truncated,
            model: model.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Shared by all workers of a run. Only successful completions are stored.
#[async_trait]
pub trait CompletionCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedCompletion>;

    /// Stores `value` unless the key is already present. Returns false when another
    /// writer got there first; that writer's value is kept.
    fn insert_if_absent(&self, key: CacheKey, value: CachedCompletion) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry that was neither read nor written since the cache was opened.
    /// Returns the number of entries removed.
    fn prune_untouched(&self) -> usize;

    async fn flush(&self) -> Result<()>;
}

/// Entries plus the keys used during this run.
#[derive(Debug, Default)]
struct EntryTable {
    entries: RwLock<HashMap<CacheKey, CachedCompletion>>,
    touched: RwLock<HashSet<CacheKey>>,
}

impl EntryTable {
    fn with_entries(entries: HashMap<CacheKey, CachedCompletion>) -> Self {
        Self {
            entries: RwLock::new(entries),
            touched: RwLock::new(HashSet::new()),
        }
    }

    fn touch(&self, key: &CacheKey) {
        if let Ok(mut touched) = self.touched.write() {
            touched.insert(key.clone());
        }
    }

    fn get(&self, key: &CacheKey) -> Option<CachedCompletion> {
        let hit = self.entries.read().ok()?.get(key).cloned();
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    fn insert_if_absent(&self, key: CacheKey, value: CachedCompletion) -> bool {
        self.touch(&key);
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, value);
        true
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    fn prune_untouched(&self) -> usize {
        let (Ok(mut entries), Ok(touched)) = (self.entries.write(), self.touched.read()) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|key, _| touched.contains(key));
        before - entries.len()
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    table: EntryTable,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedCompletion> {
        self.table.get(key)
    }

    fn insert_if_absent(&self, key: CacheKey, value: CachedCompletion) -> bool {
        self.table.insert_if_absent(key, value)
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn prune_untouched(&self) -> usize {
        self.table.prune_untouched()
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// JSON file backed cache. Loaded once on open, written back on `flush`.
#[derive(Debug)]
pub struct FileCache {
    storage_path: PathBuf,
    table: EntryTable,
    dirty: AtomicBool,
}

impl FileCache {
    pub async fn open(storage_path: impl AsRef<Path>) -> Result<Self> {
        let storage_path = storage_path.as_ref().to_path_buf();
        let entries = load_entries(&storage_path).await?;
        info!(
            "Loaded {} cached completions from {}",
            entries.len(),
            storage_path.display()
        );

        Ok(Self {
            storage_path,
            table: EntryTable::with_entries(entries),
            dirty: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }
}

#[async_trait]
impl CompletionCache for FileCache {
    fn get(&self, key: &CacheKey) -> Option<CachedCompletion> {
        self.table.get(key)
    }

    fn insert_if_absent(&self, key: CacheKey, value: CachedCompletion) -> bool {
        let inserted = self.table.insert_if_absent(key, value);
        if inserted {
            self.dirty.store(true, Ordering::SeqCst);
        }
        inserted
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn prune_untouched(&self) -> usize {
        let pruned = self.table.prune_untouched();
        if pruned > 0 {
            debug!("Pruned {} stale cache entries", pruned);
            self.dirty.store(true, Ordering::SeqCst);
        }
        pruned
    }

    async fn flush(&self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let contents = {
            let entries = self
                .table
                .entries
                .read()
                .map_err(|_| PipelineError::Validation("cache lock poisoned".to_string()))?;
            let keyed: HashMap<&str, &CachedCompletion> =
                entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
            serde_json::to_string_pretty(&keyed).map_err(PipelineError::serialization)?
        };

        if let Some(parent) = self.storage_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::FileOperation {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        fs::write(&self.storage_path, contents)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: self.storage_path.clone(),
                source: e,
            })?;

        debug!("Saved cache to {}", self.storage_path.display());
        Ok(())
    }
}

async fn load_entries(path: &Path) -> Result<HashMap<CacheKey, CachedCompletion>> {
    if !path.exists() {
        debug!("No existing cache file found at {}", path.display());
        return Ok(HashMap::new());
    }

    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source: e,
        })?;

    match serde_json::from_str::<HashMap<String, CachedCompletion>>(&contents) {
        Ok(raw) => Ok(raw.into_iter().map(|(k, v)| (CacheKey(k), v)).collect()),
        Err(e) => {
            warn!("Failed to parse cache file, starting fresh: {}", e);
            Ok(HashMap::new())
        }
    }
}
