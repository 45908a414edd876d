// file: src/repository/source.rs
// description: resolution of a repository reference into a local path or remote url
// reference: internal module structure

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryReference {
    Local(PathBuf),
    Remote(String),
}

impl RepositoryReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(PipelineError::RepositoryUnavailable(
                "empty repository reference".to_string(),
            ));
        }

        if Validator::is_valid_url(reference) || Validator::is_scp_remote(reference) {
            Ok(RepositoryReference::Remote(reference.to_string()))
        } else {
            Ok(RepositoryReference::Local(PathBuf::from(reference)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RepositoryReference::Remote(_))
    }

    /// Project name derived from the last path segment, without a `.git` suffix.
    pub fn display_name(&self) -> String {
        let raw = match self {
            RepositoryReference::Local(path) => path
                .canonicalize()
                .unwrap_or_else(|_| path.clone())
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            RepositoryReference::Remote(url) => url
                .trim_end_matches('/')
                .rsplit(['/', ':'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        let name = raw.trim_end_matches(".git");
        if name.is_empty() {
            "repository".to_string()
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryReference::Local(path) => write!(f, "{}", path.display()),
            RepositoryReference::Remote(url) => f.write_str(url),
        }
    }
}
