//! Cache backends
//!
//! [`CacheBackend`] is the get/set/delete contract every store implements.
//! Two implementations ship with the crate:
//!
//! - [`crate::JsonFileBackend`]: durable, one JSON file per fingerprint
//! - [`InMemoryBackend`]: moka-backed map living as long as the process
//!
//! The in-memory backend is a **degraded mode**, used only when nothing
//! durable is configured. Its contents vanish on restart.

use crate::entry::CacheEntry;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use moka::Expiry;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default capacity of the in-memory backend
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Key/value contract for cache storage
///
/// Implementations hand out owned copies; mutating a returned entry never
/// changes what is stored.
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Fetch an entry, `None` on miss or expiry
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Store an entry
    ///
    /// `Some(ttl)` sets the entry to expire `ttl` from now. `None` keeps the
    /// expiry already recorded for this fingerprint, or never expires a new
    /// one.
    async fn set(&self, entry: CacheEntry, ttl: Option<Duration>) -> Result<()>;

    /// Replace a live entry, keeping its expiry
    ///
    /// Returns `false` and stores nothing when the fingerprint has no live
    /// entry, so an entry that expired meanwhile stays gone.
    async fn update(&self, entry: CacheEntry) -> Result<bool>;

    /// Remove an entry; removing a missing entry is not an error
    async fn delete(&self, fingerprint: &Fingerprint) -> Result<()>;

    /// Whether entries survive a process restart
    fn is_durable(&self) -> bool;
}

#[derive(Debug)]
struct StoredEntry {
    entry: CacheEntry,
    ttl: Option<Duration>,
}

/// Per-entry expiry driven by the TTL passed to `set`
struct EntryExpiry;

impl Expiry<Fingerprint, Arc<StoredEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        value: &Arc<StoredEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        value: &Arc<StoredEntry>,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(duration_until_expiry)
    }
}

static SHARED: Lazy<InMemoryBackend> = Lazy::new(|| InMemoryBackend::new(DEFAULT_CAPACITY));

/// In-process cache backend
///
/// Clones share the same underlying map. Construct one explicitly and pass
/// it around, or use [`InMemoryBackend::shared`] for the instance that lives
/// from first use until process exit.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    inner: Cache<Fingerprint, Arc<StoredEntry>>,
}

impl InMemoryBackend {
    /// Create an independent backend holding up to `max_capacity` entries
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryExpiry)
                .build(),
        }
    }

    /// Process-wide instance
    #[must_use]
    pub fn shared() -> Self {
        SHARED.clone()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        Ok(self
            .inner
            .get(fingerprint)
            .await
            .map(|stored| stored.entry.clone()))
    }

    async fn set(&self, entry: CacheEntry, ttl: Option<Duration>) -> Result<()> {
        let fingerprint = entry.fingerprint;
        self.inner
            .insert(fingerprint, Arc::new(StoredEntry { entry, ttl }))
            .await;
        Ok(())
    }

    async fn update(&self, entry: CacheEntry) -> Result<bool> {
        let fingerprint = entry.fingerprint;
        let result = self
            .inner
            .entry(fingerprint)
            .and_compute_with(|existing| {
                let op = match existing {
                    Some(_) => Op::Put(Arc::new(StoredEntry { entry, ttl: None })),
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    async fn delete(&self, fingerprint: &Fingerprint) -> Result<()> {
        self.inner.invalidate(fingerprint).await;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}
