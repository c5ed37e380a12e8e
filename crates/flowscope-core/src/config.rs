//! Flowscope configuration
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! prompt_version = "v3"
//! model_id = "decomposer-large"
//!
//! [cache]
//! directory = ".flowscope/cache"
//! ttl_secs = 604800
//!
//! [layout]
//! base_row_spacing = 160.0
//! ```
//!
//! `FLOWSCOPE_PROMPT_VERSION`, `FLOWSCOPE_MODEL_ID` and `FLOWSCOPE_CACHE_DIR`
//! override the file.

use crate::error::ConfigError;
use flowscope_cache::{AnalysisCache, InMemoryBackend, JsonFileBackend};
use flowscope_graph::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding [`FlowscopeConfig::prompt_version`]
pub const ENV_PROMPT_VERSION: &str = "FLOWSCOPE_PROMPT_VERSION";
/// Environment variable overriding [`FlowscopeConfig::model_id`]
pub const ENV_MODEL_ID: &str = "FLOWSCOPE_MODEL_ID";
/// Environment variable overriding [`CacheConfig::directory`]
pub const ENV_CACHE_DIR: &str = "FLOWSCOPE_CACHE_DIR";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowscopeConfig {
    /// Prompt template version; part of every cache fingerprint
    pub prompt_version: String,
    /// Model identifier; part of every cache fingerprint
    pub model_id: String,
    /// Analysis cache settings
    pub cache: CacheConfig,
    /// Layout spacing
    pub layout: LayoutConfig,
}

impl Default for FlowscopeConfig {
    fn default() -> Self {
        Self {
            prompt_version: "v1".to_string(),
            model_id: "default".to_string(),
            cache: CacheConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Analysis cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the durable file backend; unset means in-memory only
    pub directory: Option<PathBuf>,
    /// Entry lifetime; unset means entries never expire
    pub ttl_secs: Option<u64>,
    /// Capacity of the in-memory backend
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            ttl_secs: Some(7 * 24 * 60 * 60),
            max_capacity: flowscope_cache::backend::DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Build the analysis cache these settings describe
    ///
    /// A configured directory selects the file backend. Without one, or if
    /// the directory cannot be opened, the cache runs in degraded in-memory
    /// mode rather than failing.
    pub async fn open(&self) -> AnalysisCache {
        let cache = match &self.directory {
            Some(directory) => match JsonFileBackend::open(directory).await {
                Ok(backend) => AnalysisCache::new(Arc::new(backend)),
                Err(e) => {
                    tracing::warn!(
                        directory = %directory.display(),
                        error = %e,
                        "Cannot open cache directory, falling back to in-memory cache"
                    );
                    AnalysisCache::degraded()
                }
            },
            None => AnalysisCache::new(Arc::new(InMemoryBackend::new(self.max_capacity))),
        };
        match self.ttl() {
            Some(ttl) => cache.with_default_ttl(ttl),
            None => cache,
        }
    }
}

impl FlowscopeConfig {
    /// Parse TOML
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file and apply environment overrides
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, |key| std::env::var(key).ok())
    }

    /// Read a TOML file and apply overrides from `lookup`
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load_with_overrides(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?.with_overrides(lookup);
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `FLOWSCOPE_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup; blank values are ignored
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(prompt_version) = lookup(ENV_PROMPT_VERSION) {
            self.prompt_version = prompt_version;
        }
        if let Some(model_id) = lookup(ENV_MODEL_ID) {
            self.model_id = model_id;
        }
        if let Some(directory) = lookup(ENV_CACHE_DIR) {
            self.cache.directory = Some(PathBuf::from(directory));
        }
        self
    }

    /// Set prompt version
    #[inline]
    #[must_use]
    pub fn with_prompt_version(mut self, prompt_version: impl Into<String>) -> Self {
        self.prompt_version = prompt_version.into();
        self
    }

    /// Set model identifier
    #[inline]
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Use the file cache backend in `directory`
    #[inline]
    #[must_use]
    pub fn with_cache_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.cache.directory = Some(directory.into());
        self
    }
}
