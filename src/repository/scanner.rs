// file: src/repository/scanner.rs
// description: Directory walking into an in-memory repository tree with filtering
// reference: https://docs.rs/walkdir

use crate::config::RepositoryConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DirectoryNode, FileNode, Node, RepositoryTree, SkipReason};
use crate::repository::classifier::language_for_path;
use crate::repository::notebook::{is_notebook, notebook_to_script};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const BINARY_SNIFF_BYTES: usize = 8 * 1024;

pub struct RepositoryIngestor {
    config: RepositoryConfig,
}

impl RepositoryIngestor {
    pub fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    pub fn ingest(&self, root: &Path, name: &str) -> Result<RepositoryTree> {
        info!("Scanning directory: {}", root.display());
        if !root.is_dir() {
            return Err(PipelineError::RepositoryUnavailable(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let max_size = self.config.max_file_size_kb * 1024;
        let mut stack = vec![DirectoryNode::new(PathBuf::new())];
        let mut flagged = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                !self.should_skip(relative)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            while stack.len() > entry.depth() {
                close_directory(&mut stack);
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stack.push(DirectoryNode::new(relative));
                continue;
            }
            if !file_type.is_file() {
                debug!("Skipping non-regular file: {}", relative.display());
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Skipping {}: {}", relative.display(), e);
                    continue;
                }
            };
            let language = language_for_path(&relative).map(str::to_string);

            let node = if size > max_size {
                debug!("Flagging large file ({} KB): {}", size / 1024, relative.display());
                flagged += 1;
                FileNode::flagged(relative, size, language, SkipReason::Oversized)
            } else {
                match fs::read(entry.path()) {
                    Ok(content) if is_binary(&content) => {
                        debug!("Flagging binary file: {}", relative.display());
                        flagged += 1;
                        FileNode::flagged(relative, size, language, SkipReason::Binary)
                    }
                    Ok(content) if is_notebook(&relative) => {
                        let content = match notebook_to_script(&content) {
                            Ok(script) => script.into_bytes(),
                            Err(e) => {
                                warn!("Keeping raw notebook {}: {}", relative.display(), e);
                                content
                            }
                        };
                        FileNode::new(relative, content, size, language)
                    }
                    Ok(content) => FileNode::new(relative, content, size, language),
                    Err(e) => {
                        warn!("Skipping {}: {}", relative.display(), e);
                        continue;
                    }
                }
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(Node::File(node));
            }
        }

        while stack.len() > 1 {
            close_directory(&mut stack);
        }
        let root_node = stack.pop().unwrap_or_default();
        let tree = RepositoryTree::new(name.to_string(), root_node);

        info!(
            "Found {} files ({} flagged as non-summarizable)",
            tree.file_count(),
            flagged
        );
        Ok(tree)
    }

    /// `ingest` on the blocking pool, for callers on the async runtime.
    pub async fn ingest_blocking(self, root: PathBuf, name: String) -> Result<RepositoryTree> {
        tokio::task::spawn_blocking(move || self.ingest(&root, &name))
            .await
            .map_err(|e| PipelineError::Validation(format!("Ingestion task failed: {}", e)))?
    }

    /// `*.ext` entries match a file-name suffix; other entries match a whole path component.
    pub fn should_skip(&self, relative: &Path) -> bool {
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        for pattern in &self.config.ignore_patterns {
            if let Some(suffix) = pattern.strip_prefix('*') {
                if file_name.ends_with(suffix) {
                    return true;
                }
            } else if relative.components().any(|c| match c {
                Component::Normal(part) => part == pattern.as_str(),
                _ => false,
            }) {
                return true;
            }
        }

        false
    }
}

fn close_directory(stack: &mut Vec<DirectoryNode>) {
    if let Some(done) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(Node::Directory(done));
    }
}

fn is_binary(content: &[u8]) -> bool {
    content
        .iter()
        .take(BINARY_SNIFF_BYTES)
        .any(|&b| b == 0)
}
