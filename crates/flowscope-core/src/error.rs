//! Error types for Flowscope Core
//!
//! Only collaborators fail: the model call, the decomposition store and
//! configuration I/O. Repair, scoring and layout never return errors, and
//! cache failures are absorbed as misses.

use flowscope_cache::FingerprintError;
use flowscope_model::DecompositionId;
use std::path::PathBuf;

/// Main analysis error type
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Description is empty after trimming
    #[error("process description is empty")]
    EmptyDescription,

    /// Model call failed
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    /// Model output failed schema validation
    #[error("model output rejected: {0}")]
    Schema(#[from] SchemaError),

    /// Decomposition store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Request could not be fingerprinted
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    /// Re-analysis target does not exist
    #[error("parent decomposition not found: {0}")]
    ParentNotFound(DecompositionId),
}

impl AnalysisError {
    /// Check if retrying the same request could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Model(e) => e.is_retryable(),
            AnalysisError::Store(e) => e.is_retryable(),
            AnalysisError::EmptyDescription
            | AnalysisError::Schema(_)
            | AnalysisError::Fingerprint(_)
            | AnalysisError::ParentNotFound(_) => false,
        }
    }
}

/// Failures reported by a [`crate::ModelClient`]
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Network or transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider asked us to back off
    #[error("rate limited")]
    RateLimited {
        /// Suggested wait, if the provider gave one
        retry_after_secs: Option<u64>,
    },

    /// Provider refused the request
    #[error("request refused: {0}")]
    Refused(String),

    /// Call did not complete in time
    #[error("model call timed out after {duration_secs}s")]
    Timeout {
        /// Elapsed time
        duration_secs: u64,
    },
}

impl ModelError {
    /// Check if error is transient
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ModelError::Refused(_))
    }
}

/// Model output that does not match the decomposition schema
///
/// Fatal: the same output is never retried.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Nothing to parse
    #[error("model returned no content")]
    Empty,

    /// JSON did not decode into a decomposition
    #[error("invalid decomposition JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decomposition store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store is unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored record could not be decoded
    #[error("corrupt record {id}: {reason}")]
    Corrupt {
        /// Record ID
        id: DecompositionId,
        /// What went wrong
        reason: String,
    },
}

impl StoreError {
    /// Check if error is transient
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for [`crate::FlowscopeConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
