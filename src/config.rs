//! Runtime configuration.
//!
//! Loaded from a JSON file when one is given; every field has a default.
//! Command-line flags are applied on top before validation.

use crate::activity_log::DEFAULT_CAPACITY;
use crate::integration::PlacementInfo;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Entries kept in the activity panel
    pub capacity: usize,
    /// How long teardown waits for in-flight lookups
    pub shutdown_grace_ms: u64,
    pub api: ApiConfig,
    pub placement: PlacementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            shutdown_grace_ms: 5000,
            api: ApiConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GET target; `{id}` is replaced with the product id
    pub endpoint: String,
    /// Sent as `Authorization: Bearer <token>` when set
    pub token: Option<String>,
    /// No timeout unless set
    pub timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/mock_product_data.json".into(),
            token: None,
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub placement: String,
    /// Deal the app is embedded in. Unset means "not in a deal placement".
    pub entity_id: Option<String>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            placement: "CRM_DEAL_DETAIL_TAB".into(),
            entity_id: None,
        }
    }
}

impl PlacementConfig {
    pub fn to_info(&self) -> PlacementInfo {
        let options = match &self.entity_id {
            Some(id) => json!({ "entityId": id }),
            None => json!({}),
        };
        PlacementInfo {
            placement: self.placement.clone(),
            options,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.api.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("api.endpoint is empty".into()));
        }
        Ok(())
    }
}
