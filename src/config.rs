// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub ignore_patterns: Vec<String>,
    pub max_file_size_kb: u64,
    pub shallow_clone: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_input_tokens: usize,
    pub digest_max_tokens: usize,
    #[serde(default)]
    pub offline: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub max_in_flight: usize,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub request_timeout_secs: u64,
    pub run_deadline_secs: u64,
    pub cancel_grace_ms: u64,
    pub split_threshold_bytes: usize,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub title: Option<String>,
    pub badge_style: String,
    pub tree_max_depth: usize,
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms)
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(PipelineError::config)?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GIT_README")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(PipelineError::config)?;

        let config: Config = settings.try_deserialize().map_err(PipelineError::config)?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            repository: RepositoryConfig {
                ignore_patterns: [
                    ".git",
                    "target",
                    "node_modules",
                    "__pycache__",
                    ".venv",
                    "venv",
                    "dist",
                    "build",
                    ".idea",
                    ".vscode",
                    ".DS_Store",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                max_file_size_kb: 512,
                shallow_clone: true,
            },
            llm: LlmConfig {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "openai/gpt-oss-120b".to_string(),
                api_key: None,
                temperature: 0.2,
                max_output_tokens: 300,
                max_input_tokens: 3900,
                digest_max_tokens: 3900,
                offline: false,
            },
            pipeline: PipelineConfig {
                max_in_flight: 4,
                max_attempts: 4,
                backoff_base_ms: 500,
                backoff_max_ms: 8000,
                request_timeout_secs: 60,
                run_deadline_secs: 1800,
                cancel_grace_ms: 5000,
                split_threshold_bytes: 16 * 1024,
                show_progress: true,
            },
            cache: CacheConfig {
                enabled: true,
                path: PathBuf::from(".git_readme/cache.json"),
            },
            document: DocumentConfig {
                title: None,
                badge_style: "flat".to_string(),
                tree_max_depth: 4,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_in_flight == 0 {
            return Err(PipelineError::Config(
                "max_in_flight must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_attempts == 0 {
            return Err(PipelineError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.split_threshold_bytes == 0 {
            return Err(PipelineError::Config(
                "split_threshold_bytes must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.request_timeout_secs >= self.pipeline.run_deadline_secs {
            return Err(PipelineError::Config(
                "request_timeout_secs must be shorter than run_deadline_secs".to_string(),
            ));
        }

        if self.llm.max_input_tokens == 0 || self.llm.digest_max_tokens == 0 {
            return Err(PipelineError::Config(
                "token budgets must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = Config::default_config();
        config.pipeline.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_timeout_longer_than_deadline() {
        let mut config = Config::default_config();
        config.pipeline.request_timeout_secs = config.pipeline.run_deadline_secs;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_over_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("readme.toml");
        fs::write(
            &path,
            "[pipeline]\nmax_in_flight = 9\n\n[llm]\nmodel = \"llama-3.1-8b-instant\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.pipeline.max_in_flight, 9);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.pipeline.max_attempts, 4);
    }
}
