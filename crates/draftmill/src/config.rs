//! Application configuration.
//!
//! Loaded from a JSON file, validated, then used to assemble the HTTP
//! collaborators. API keys stay in the config file; they are wrapped in
//! `SecretString` the moment they leave this module.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::Database;
use crate::generate::{HttpContentGenerator, HttpImageGenerator};
use crate::pipeline::PipelineRunner;
use crate::publish::hashnode::{HashnodePublisher, DEFAULT_ENDPOINT};
use crate::queue::QueueStore;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: String,
    pub image_backend: BackendConfig,
    pub content_backend: ContentBackendConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Pre-work delay applied before each pipeline stage.
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,
    /// Database file path; `None` selects the per-user default.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBackendConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_content_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_publisher_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_publisher_endpoint(),
            tag_ids: Vec::new(),
        }
    }
}

fn default_stage_delay_ms() -> u64 {
    1000
}

fn default_content_model() -> String {
    "gpt-4o".to_string()
}

fn default_publisher_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.image_backend.endpoint.is_empty() {
        return Err(ConfigError::Validation {
            message: "image_backend.endpoint must not be empty".to_string(),
        });
    }
    if config.content_backend.endpoint.is_empty() {
        return Err(ConfigError::Validation {
            message: "content_backend.endpoint must not be empty".to_string(),
        });
    }
    if config.publisher.endpoint.is_empty() {
        return Err(ConfigError::Validation {
            message: "publisher.endpoint must not be empty".to_string(),
        });
    }

    Ok(())
}

impl AppConfig {
    /// Assembles the pipeline runner with HTTP collaborators built from
    /// this configuration.
    pub fn build_runner(&self, db: Database) -> Result<PipelineRunner, crate::DraftmillError> {
        let image = HttpImageGenerator::new(
            self.image_backend.endpoint.clone(),
            SecretString::from(self.image_backend.api_key.clone()),
        )?;
        let content = HttpContentGenerator::new(
            self.content_backend.endpoint.clone(),
            SecretString::from(self.content_backend.api_key.clone()),
            self.content_backend.model.clone(),
        )?;
        let publisher = HashnodePublisher::new(self.publisher.endpoint.clone())?;

        let mut runner = PipelineRunner::new(
            QueueStore::new(db.clone()),
            db,
            Arc::new(image),
            Arc::new(content),
            Arc::new(publisher),
        )
        .with_stage_delay(Duration::from_millis(self.stage_delay_ms));

        if !self.publisher.tag_ids.is_empty() {
            runner = runner.with_tag_ids(self.publisher.tag_ids.clone());
        }

        Ok(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "image_backend": {
                "endpoint": "https://images.example/v1/generate",
                "api_key": "img-key"
            },
            "content_backend": {
                "endpoint": "https://llm.example/v1/chat/completions",
                "api_key": "llm-key"
            }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.stage_delay_ms, 1000);
        assert_eq!(config.content_backend.model, "gpt-4o");
        assert_eq!(config.publisher.endpoint, DEFAULT_ENDPOINT);
        assert!(config.publisher.tag_ids.is_empty());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_load_config_with_overrides() {
        let config_json = r#"
        {
            "version": "1.0",
            "image_backend": {
                "endpoint": "https://images.example/v1/generate",
                "api_key": "img-key"
            },
            "content_backend": {
                "endpoint": "https://llm.example/v1/chat/completions",
                "api_key": "llm-key",
                "model": "gpt-4.1"
            },
            "publisher": {
                "endpoint": "https://gql.example",
                "tag_ids": ["t1", "t2"]
            },
            "stage_delay_ms": 0,
            "database_path": "/tmp/pipeline.db"
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.content_backend.model, "gpt-4.1");
        assert_eq!(config.publisher.tag_ids, vec!["t1", "t2"]);
        assert_eq!(config.stage_delay_ms, 0);
        assert_eq!(
            config.database_path.as_deref(),
            Some(Path::new("/tmp/pipeline.db"))
        );
    }

    #[test]
    fn test_invalid_version() {
        let config_json = r#"
        {
            "version": "2.0",
            "image_backend": { "endpoint": "https://i.example", "api_key": "k" },
            "content_backend": { "endpoint": "https://c.example", "api_key": "k" }
        }
        "#;

        let result = load_config_from_str(config_json);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config_json = r#"
        {
            "version": "1.0",
            "image_backend": { "endpoint": "", "api_key": "k" },
            "content_backend": { "endpoint": "https://c.example", "api_key": "k" }
        }
        "#;

        let result = load_config_from_str(config_json);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_missing_backend_is_parse_error() {
        let result = load_config_from_str(r#"{ "version": "1.0" }"#);
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }
}
