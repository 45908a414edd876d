// file: src/repository/sync.rs
// description: Repository acquisition; remote references are cloned into a scoped working copy
// reference: https://docs.rs/gix

use crate::config::RepositoryConfig;
use crate::error::{PipelineError, Result};
use crate::repository::source::RepositoryReference;
use crate::utils::Validator;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Local checkout used for one run. A clone lives in a temporary directory that is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct WorkingCopy {
    root: PathBuf,
    name: String,
    _temp: Option<TempDir>,
}

impl WorkingCopy {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_transient(&self) -> bool {
        self._temp.is_some()
    }
}

pub struct RepositorySync {
    config: RepositoryConfig,
}

impl RepositorySync {
    pub fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    pub async fn acquire(
        &self,
        reference: &RepositoryReference,
        cancel: &CancellationToken,
    ) -> Result<WorkingCopy> {
        let name = reference.display_name();
        match reference {
            RepositoryReference::Local(path) => {
                Validator::validate_directory(path)
                    .map_err(|e| PipelineError::RepositoryUnavailable(e.to_string()))?;
                let root = path.canonicalize().map_err(|e| {
                    PipelineError::RepositoryUnavailable(format!("{}: {}", path.display(), e))
                })?;
                info!("Using local repository at {}", root.display());
                Ok(WorkingCopy {
                    root,
                    name,
                    _temp: None,
                })
            }
            RepositoryReference::Remote(url) => self.clone_remote(url, name, cancel).await,
        }
    }

    async fn clone_remote(
        &self,
        url: &str,
        name: String,
        cancel: &CancellationToken,
    ) -> Result<WorkingCopy> {
        info!("Cloning repository from {}", url);

        let temp = TempDir::new().map_err(|e| {
            PipelineError::RepositoryUnavailable(format!("Failed to create working copy: {}", e))
        })?;
        let dest = temp.path().join(&name);
        let interrupt = Arc::new(AtomicBool::new(false));

        let mut task = tokio::task::spawn_blocking({
            let url = url.to_string();
            let dest = dest.clone();
            let interrupt = Arc::clone(&interrupt);
            let shallow = self.config.shallow_clone;
            move || clone_into(&url, &dest, shallow, &interrupt)
        });

        let joined = tokio::select! {
            joined = &mut task => joined,
            _ = cancel.cancelled() => {
                warn!("Clone interrupted by cancellation");
                interrupt.store(true, Ordering::SeqCst);
                // Let gix observe the flag before the directory is removed.
                let _ = task.await;
                return Err(PipelineError::Cancelled);
            }
        };

        joined
            .map_err(|e| PipelineError::RepositoryUnavailable(format!("Clone task failed: {}", e)))??;

        info!("Repository cloned into {}", dest.display());
        Ok(WorkingCopy {
            root: dest,
            name,
            _temp: Some(temp),
        })
    }
}

fn clone_into(url: &str, dest: &Path, shallow: bool, interrupt: &AtomicBool) -> Result<()> {
    let unavailable = |stage: &str, e: &dyn std::fmt::Display| {
        PipelineError::RepositoryUnavailable(format!("{} failed for {}: {}", stage, url, e))
    };

    let mut prepare = gix::prepare_clone(url, dest).map_err(|e| unavailable("Clone", &e))?;
    if shallow {
        prepare = prepare.with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(
            NonZeroU32::MIN,
        ));
    }

    debug!("Fetching objects from {}", url);
    let (mut checkout, _) = prepare
        .fetch_then_checkout(gix::progress::Discard, interrupt)
        .map_err(|e| unavailable("Fetch", &e))?;

    debug!("Checking out main worktree");
    checkout
        .main_worktree(gix::progress::Discard, interrupt)
        .map_err(|e| unavailable("Checkout", &e))?;

    Ok(())
}
