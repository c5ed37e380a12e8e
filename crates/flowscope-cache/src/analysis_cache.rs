//! Analysis cache front end
//!
//! Wraps a [`CacheBackend`] with the policy the analyzer relies on:
//! - lookups count hits and hand back owned copies
//! - backend failures are logged and treated as misses
//! - stores never fail the caller
//!
//! The cache is never the source of truth. Losing an entry only costs a
//! recomputation.

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::entry::CacheEntry;
use crate::fingerprint::Fingerprint;
use std::sync::Arc;
use std::time::Duration;

/// Fingerprint-keyed cache of analysis results
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Option<Duration>,
}

impl AnalysisCache {
    /// Cache over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        if !backend.is_durable() {
            tracing::warn!("Analysis cache running in degraded mode: entries are not durable");
        }
        Self {
            backend,
            default_ttl: None,
        }
    }

    /// Cache over the process-wide in-memory backend
    ///
    /// Degraded mode: for use only when no durable backend is configured.
    #[must_use]
    pub fn degraded() -> Self {
        Self::new(Arc::new(InMemoryBackend::shared()))
    }

    /// TTL applied when [`AnalysisCache::store`] is given none
    #[inline]
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// True when the backend does not survive a restart
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.backend.is_durable()
    }

    /// Look up an entry, counting the hit
    ///
    /// The incremented hit count is written back without touching the
    /// entry's expiry, and only while the entry is still live. Concurrent
    /// lookups may lose an increment.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let mut entry = match self.backend.get(fingerprint).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!(%fingerprint, "Cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(%fingerprint, error = %e, "Cache lookup failed, treating as miss");
                return None;
            }
        };

        entry.hit_count = entry.hit_count.saturating_add(1);
        match self.backend.update(entry.clone()).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(%fingerprint, "Cache entry expired before hit was recorded"),
            Err(e) => tracing::warn!(%fingerprint, error = %e, "Failed to record cache hit"),
        }
        tracing::debug!(%fingerprint, hits = entry.hit_count, "Cache hit");
        Some(entry)
    }

    /// Store an entry
    ///
    /// `ttl` overrides the default TTL. Failures are logged and absorbed.
    pub async fn store(&self, entry: CacheEntry, ttl: Option<Duration>) {
        let fingerprint = entry.fingerprint;
        let ttl = ttl.or(self.default_ttl);
        match self.backend.set(entry, ttl).await {
            Ok(()) => tracing::debug!(%fingerprint, ?ttl, "Cached analysis"),
            Err(e) => tracing::warn!(%fingerprint, error = %e, "Failed to cache analysis"),
        }
    }

    /// Remove an entry, absorbing failures
    pub async fn invalidate(&self, fingerprint: &Fingerprint) {
        if let Err(e) = self.backend.delete(fingerprint).await {
            tracing::warn!(%fingerprint, error = %e, "Failed to invalidate cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::GenerationMetadata;
    use crate::error::{CacheError, Result};
    use crate::fingerprint::FingerprintInput;
    use async_trait::async_trait;
    use flowscope_model::{Confidence, Decomposition, HealthMetrics};

    #[derive(Debug)]
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _: &Fingerprint) -> Result<Option<CacheEntry>> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn set(&self, _: CacheEntry, _: Option<Duration>) -> Result<()> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn update(&self, _: CacheEntry) -> Result<bool> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _: &Fingerprint) -> Result<()> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        fn is_durable(&self) -> bool {
            true
        }
    }

    /// Entry expires right after it is read
    #[derive(Debug)]
    struct ExpiresOnRead(InMemoryBackend);

    #[async_trait]
    impl CacheBackend for ExpiresOnRead {
        async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
            let found = self.0.get(fingerprint).await?;
            self.0.delete(fingerprint).await?;
            Ok(found)
        }

        async fn set(&self, entry: CacheEntry, ttl: Option<Duration>) -> Result<()> {
            self.0.set(entry, ttl).await
        }

        async fn update(&self, entry: CacheEntry) -> Result<bool> {
            self.0.update(entry).await
        }

        async fn delete(&self, fingerprint: &Fingerprint) -> Result<()> {
            self.0.delete(fingerprint).await
        }

        fn is_durable(&self) -> bool {
            false
        }
    }

    fn entry() -> CacheEntry {
        let fingerprint =
            Fingerprint::compute(&FingerprintInput::new("approve invoices", "v1", "m1")).unwrap();
        let health = HealthMetrics {
            complexity: 10,
            fragility: 20,
            automation_potential: 30,
            team_load_balance: 40,
            team_size: Some(3),
            confidence: Confidence::High,
            confidence_reason: String::new(),
        };
        CacheEntry::new(
            fingerprint,
            Decomposition::new("Invoices", vec![], vec![], health),
            GenerationMetadata::new("v1", "m1").with_tokens(120, 800),
        )
    }

    #[tokio::test]
    async fn lookup_counts_hits() {
        let cache = AnalysisCache::new(Arc::new(InMemoryBackend::new(8)));
        let stored = entry();
        let fingerprint = stored.fingerprint;

        assert!(cache.lookup(&fingerprint).await.is_none());
        cache.store(stored, None).await;

        assert_eq!(cache.lookup(&fingerprint).await.unwrap().hit_count, 1);
        assert_eq!(cache.lookup(&fingerprint).await.unwrap().hit_count, 2);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = AnalysisCache::new(Arc::new(InMemoryBackend::new(8)));
        let stored = entry();
        let fingerprint = stored.fingerprint;

        cache.store(stored, None).await;
        cache.invalidate(&fingerprint).await;
        assert!(cache.lookup(&fingerprint).await.is_none());
    }

    #[tokio::test]
    async fn broken_backend_degrades_to_miss() {
        let cache = AnalysisCache::new(Arc::new(BrokenBackend));
        let stored = entry();
        let fingerprint = stored.fingerprint;

        cache.store(stored, Some(Duration::from_secs(60))).await;
        cache.invalidate(&fingerprint).await;
        assert!(cache.lookup(&fingerprint).await.is_none());
        assert!(!cache.is_degraded());
    }

    #[tokio::test]
    async fn hit_write_back_keeps_ttl() {
        let cache = AnalysisCache::new(Arc::new(InMemoryBackend::new(8)))
            .with_default_ttl(Duration::from_millis(100));
        let stored = entry();
        let fingerprint = stored.fingerprint;

        cache.store(stored, None).await;
        assert!(cache.lookup(&fingerprint).await.is_some());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(cache.lookup(&fingerprint).await.is_none());
    }

    #[tokio::test]
    async fn hit_on_expiring_entry_does_not_revive_it() {
        let memory = InMemoryBackend::new(8);
        let cache = AnalysisCache::new(Arc::new(ExpiresOnRead(memory.clone())));
        let stored = entry();
        let fingerprint = stored.fingerprint;

        cache.store(stored, Some(Duration::from_secs(60))).await;
        assert_eq!(cache.lookup(&fingerprint).await.map(|e| e.hit_count), Some(1));
        assert!(memory.get(&fingerprint).await.unwrap().is_none());
    }

    #[test]
    fn degraded_mode_is_reported() {
        assert!(AnalysisCache::degraded().is_degraded());
    }
}
