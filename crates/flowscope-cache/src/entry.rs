//! Cached analysis entries

use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use flowscope_model::Decomposition;
use serde::{Deserialize, Serialize};

/// How a cached analysis was produced
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Prompt template version that produced the payload
    pub prompt_version: String,
    /// Model that produced the payload
    pub model_id: String,
    /// Prompt tokens billed
    #[serde(default)]
    pub input_tokens: u64,
    /// Completion tokens billed
    #[serde(default)]
    pub output_tokens: u64,
}

impl GenerationMetadata {
    /// Metadata for a prompt/model pair, token counts zero
    #[must_use]
    pub fn new(prompt_version: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt_version: prompt_version.into(),
            model_id: model_id.into(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    /// Record token usage
    #[inline]
    #[must_use]
    pub fn with_tokens(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }
}

/// A repaired, scored decomposition stored under its request fingerprint
///
/// Entries are never merged; a change to any hashed input yields a new
/// fingerprint and therefore a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Cache key
    pub fingerprint: Fingerprint,
    /// Repaired and scored decomposition
    pub payload: Decomposition,
    /// How the payload was generated
    pub metadata: GenerationMetadata,
    /// When the entry was first stored
    pub cached_at: DateTime<Utc>,
    /// Successful lookups so far; advisory only
    #[serde(default)]
    pub hit_count: u64,
}

impl CacheEntry {
    /// Fresh entry with zero hits
    #[must_use]
    pub fn new(fingerprint: Fingerprint, payload: Decomposition, metadata: GenerationMetadata) -> Self {
        Self {
            fingerprint,
            payload,
            metadata,
            cached_at: Utc::now(),
            hit_count: 0,
        }
    }
}
