// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(
        r"(?i)^(?:http|ftp)s?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,63}|[A-Z]{2,63}\.[A-Z]{2,63}))(?::\d+)?(?:/?|[/?]\S+)$"
    )
    .expect("valid url regex");
    static ref SCP_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[A-Za-z0-9._/~-]+$").expect("valid scp regex");
}

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn is_valid_url(url: &str) -> bool {
        URL_PATTERN.is_match(url)
    }

    /// scp-like git remotes such as `git@github.com:owner/repo.git`.
    pub fn is_scp_remote(reference: &str) -> bool {
        SCP_PATTERN.is_match(reference)
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !Self::is_valid_url(url) {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_api_key(key: Option<&str>) -> Result<()> {
        match key {
            Some(k) if !k.trim().is_empty() => Ok(()),
            _ => Err(PipelineError::Config(
                "an API key is required unless running offline".to_string(),
            )),
        }
    }
}
