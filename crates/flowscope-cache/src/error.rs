//! Cache error types

use thiserror::Error;

/// Result alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised by cache backends
///
/// [`crate::AnalysisCache`] never surfaces these; they are logged and turned
/// into misses.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend storage could not be read or written
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be encoded or decoded
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TTL too large to represent as an expiry timestamp
    #[error("ttl out of range: {0:?}")]
    TtlOutOfRange(std::time::Duration),

    /// Backend is unreachable
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors parsing or computing a fingerprint
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Decoded fingerprint has the wrong length
    #[error("invalid fingerprint length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte count
        expected: usize,
        /// Decoded byte count
        actual: usize,
    },

    /// Not a hex string
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Stage list could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
