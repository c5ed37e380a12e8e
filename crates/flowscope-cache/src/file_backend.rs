//! Durable JSON file backend
//!
//! One `<fingerprint>.json` file per entry. Fingerprints are fixed-length
//! hex, so file names never escape the cache directory. Every write stages
//! into its own temporary file in the same directory and is then persisted
//! over the target, so readers never observe a partial entry and concurrent
//! writers of one fingerprint never share a staging file.

use crate::backend::CacheBackend;
use crate::entry::CacheEntry;
use crate::error::{CacheError, Result};
use crate::fingerprint::Fingerprint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    entry: CacheEntry,
}

impl Envelope {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Cache backend persisting entries as JSON files in a directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    directory: PathBuf,
}

impl JsonFileBackend {
    /// Open (creating if needed) a cache directory
    ///
    /// # Errors
    /// Returns error if the directory cannot be created
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        tracing::debug!(directory = %directory.display(), "Opened file cache");
        Ok(Self { directory })
    }

    /// Cache directory
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.directory.join(format!("{fingerprint}.json"))
    }

    async fn write_envelope(&self, envelope: Envelope) -> Result<()> {
        let path = self.path(&envelope.entry.fingerprint);
        let directory = self.directory.clone();
        let bytes = serde_json::to_vec(&envelope)?;
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut staging = tempfile::NamedTempFile::new_in(&directory)?;
            staging.write_all(&bytes)?;
            staging.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Unavailable(format!("cache write task failed: {e}")))??;
        Ok(())
    }

    async fn read_envelope(&self, fingerprint: &Fingerprint) -> Result<Option<Envelope>> {
        match tokio::fs::read(self.path(fingerprint)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheBackend for JsonFileBackend {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let Some(envelope) = self.read_envelope(fingerprint).await? else {
            return Ok(None);
        };
        if envelope.is_expired(Utc::now()) {
            self.delete(fingerprint).await?;
            return Ok(None);
        }
        Ok(Some(envelope.entry))
    }

    async fn set(&self, entry: CacheEntry, ttl: Option<Duration>) -> Result<()> {
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl)
                    .map_err(|_| CacheError::TtlOutOfRange(ttl))?;
                Some(Utc::now() + ttl)
            }
            // Unreadable previous files are about to be replaced anyway
            None => self
                .read_envelope(&entry.fingerprint)
                .await
                .ok()
                .flatten()
                .and_then(|previous| previous.expires_at),
        };

        self.write_envelope(Envelope { expires_at, entry }).await
    }

    async fn update(&self, entry: CacheEntry) -> Result<bool> {
        let Some(previous) = self.read_envelope(&entry.fingerprint).await? else {
            return Ok(false);
        };
        if previous.is_expired(Utc::now()) {
            self.delete(&entry.fingerprint).await?;
            return Ok(false);
        }
        self.write_envelope(Envelope {
            expires_at: previous.expires_at,
            entry,
        })
        .await?;
        Ok(true)
    }

    async fn delete(&self, fingerprint: &Fingerprint) -> Result<()> {
        match tokio::fs::remove_file(self.path(fingerprint)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_durable(&self) -> bool {
        true
    }
}
