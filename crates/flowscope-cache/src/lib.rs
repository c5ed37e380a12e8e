//! Flowscope Cache
//!
//! Content-addressed cache of analysis results, keyed by a [`Fingerprint`]
//! of the normalized request.
//!
//! # Backends
//!
//! | Backend | Durable | Use |
//! |---------|---------|-----|
//! | [`JsonFileBackend`] | yes | default when a cache directory is configured |
//! | [`InMemoryBackend`] | no | degraded mode only |
//!
//! # Example
//!
//! ```rust,ignore
//! use flowscope_cache::{AnalysisCache, Fingerprint, FingerprintInput, JsonFileBackend};
//! use std::sync::Arc;
//!
//! let cache = AnalysisCache::new(Arc::new(JsonFileBackend::open(".flowscope").await?));
//! let fingerprint = Fingerprint::compute(&FingerprintInput::new(text, "v3", "model"))?;
//! if let Some(entry) = cache.lookup(&fingerprint).await {
//!     return Ok(entry.payload);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod analysis_cache;
pub mod backend;
pub mod entry;
pub mod error;
pub mod file_backend;
pub mod fingerprint;

pub use analysis_cache::AnalysisCache;
pub use backend::{CacheBackend, InMemoryBackend};
pub use entry::{CacheEntry, GenerationMetadata};
pub use error::{CacheError, FingerprintError};
pub use file_backend::JsonFileBackend;
pub use fingerprint::{Fingerprint, FingerprintInput};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
