//! Moka backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use rendercache_backend::format::{Format, JsonFormat};
use rendercache_backend::{Backend, BackendResult, Ttl};
use rendercache_core::{BackendLabel, CacheKey, Raw};
use tracing::debug;

use crate::builder::{MokaBackendBuilder, NoCapacity};

/// Stored value together with the expiration chosen at write time.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) data: Raw,
    pub(crate) ttl: Option<Duration>,
}

/// In-memory store powered by Moka.
///
/// `MokaBackend` is a concurrent in-memory cache with per-entry expiration.
/// It uses Moka's async cache internally, which offers lock-free reads and
/// fine-grained locking for writes.
///
/// # Type Parameters
///
/// * `S` - Serialization format for cache values. Implements [`Format`].
///   Default: [`JsonFormat`].
///
/// # Caveats
///
/// - Data is **not persisted**: the cache is lost on process restart
/// - Data is **not shared** across processes
/// - Expiration is **best-effort**: Moka evicts expired entries lazily,
///   though they are never returned by reads
///
/// [`Format`]: rendercache_backend::format::Format
/// [`JsonFormat`]: rendercache_backend::format::JsonFormat
#[derive(Clone)]
pub struct MokaBackend<S = JsonFormat>
where
    S: Format,
{
    pub(crate) cache: Cache<CacheKey, Entry>,
    pub(crate) default_ttl: Option<Duration>,
    pub(crate) serializer: S,
    pub(crate) label: BackendLabel,
}

impl<S> std::fmt::Debug for MokaBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .field("serializer", &self.serializer)
            .finish()
    }
}

impl MokaBackend<JsonFormat> {
    /// Creates a new builder for `MokaBackend`.
    ///
    /// Capacity must be configured with
    /// [`max_entries`](MokaBackendBuilder::max_entries) or
    /// [`max_bytes`](MokaBackendBuilder::max_bytes) before building.
    pub fn builder() -> MokaBackendBuilder<NoCapacity, JsonFormat> {
        MokaBackendBuilder::new()
    }
}

impl<S> MokaBackend<S>
where
    S: Format,
{
    /// Expiration applied to writes made with [`Ttl::Default`].
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Runs Moka's pending maintenance (evictions, invalidations).
    ///
    /// Reads never observe invalidated or expired entries, but entry counts
    /// and capacity accounting only settle after maintenance.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Approximate number of stored entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<S> Backend for MokaBackend<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        Ok(self.cache.get(key).await.map(|entry| entry.data))
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        let entry = Entry {
            data: value,
            ttl: ttl.resolve(self.default_ttl),
        };
        self.cache.insert(key.clone(), entry).await;
        Ok(())
    }

    async fn reset(&self) -> BackendResult<()> {
        debug!(backend = %self.label, "invalidating all entries");
        self.cache.invalidate_all();
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}
