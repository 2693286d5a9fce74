//! Builder for configuring [`MokaBackend`].

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use rendercache_backend::format::{Format, JsonFormat};
use rendercache_core::{BackendLabel, CacheKey};

use crate::backend::{Entry, MokaBackend};

/// Fixed per-entry overhead estimate used by the byte weigher.
const ENTRY_OVERHEAD: usize = 64;

/// Expiration policy reading the TTL chosen when each entry was written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration;

impl Expiry<CacheKey, Entry> for Expiration {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Always use the NEW value's TTL. Moka's default keeps the old
        // expiration, which would make a persistent overwrite expire early.
        value.ttl
    }
}

/// Marker type: capacity has not been configured yet.
///
/// Call either [`max_entries()`](MokaBackendBuilder::max_entries) or
/// [`max_bytes()`](MokaBackendBuilder::max_bytes) before `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for creating and configuring a [`MokaBackend`].
///
/// Capacity uses the typestate pattern: `build()` only exists once exactly
/// one of [`max_entries`](Self::max_entries) or [`max_bytes`](Self::max_bytes)
/// has been called.
///
/// ```
/// use std::time::Duration;
/// use rendercache_moka::MokaBackend;
///
/// let backend = MokaBackend::builder()
///     .label("pages")
///     .max_bytes(64 * 1024 * 1024)
///     .default_ttl(Duration::from_secs(600))
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap, S = JsonFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: BackendLabel,
    default_ttl: Option<Duration>,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder<NoCapacity, JsonFormat> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: JsonFormat,
            label: BackendLabel::new_static("moka"),
            default_ttl: None,
            eviction_policy: None,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity, JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MokaBackendBuilder<NoCapacity, S>
where
    S: Format,
{
    /// Sets the maximum number of entries the cache can hold.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity, S> {
        MokaBackendBuilder {
            capacity: EntryCapacity(capacity),
            serializer: self.serializer,
            label: self.label,
            default_ttl: self.default_ttl,
            eviction_policy: self.eviction_policy,
        }
    }

    /// Sets the approximate memory budget in bytes.
    ///
    /// Counts the stored bytes, the key, and a fixed per-entry overhead.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity, S> {
        MokaBackendBuilder {
            capacity: ByteCapacity(bytes),
            serializer: self.serializer,
            label: self.label,
            default_ttl: self.default_ttl,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl<Cap, S> MokaBackendBuilder<Cap, S>
where
    S: Format,
{
    /// Sets a custom label for this backend.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the expiration used by writes that do not choose their own.
    ///
    /// # Default
    ///
    /// None: entries live until evicted for capacity or reset.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Sets the eviction policy for the cache.
    ///
    /// # Default
    ///
    /// - **Entry-based capacity**: [`EvictionPolicy::tiny_lfu()`]
    /// - **Byte-based capacity**: [`EvictionPolicy::lru()`]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Sets the cache value serialization format.
    ///
    /// # Default
    ///
    /// [`JsonFormat`]
    pub fn value_format<NewS>(self, serializer: NewS) -> MokaBackendBuilder<Cap, NewS>
    where
        NewS: Format,
    {
        MokaBackendBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
            default_ttl: self.default_ttl,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl<S> MokaBackendBuilder<EntryCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaBackend`] with entry-count based capacity.
    pub fn build(self) -> MokaBackend<S> {
        let policy = self
            .eviction_policy
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache: Cache<CacheKey, Entry> = CacheBuilder::new(self.capacity.0)
            .name(self.label.as_str())
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            default_ttl: self.default_ttl,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

impl<S> MokaBackendBuilder<ByteCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaBackend`] with byte-based capacity.
    ///
    /// Default eviction policy is LRU: TinyLFU's admission policy can
    /// reject new weighted entries even when eviction could make room.
    pub fn build(self) -> MokaBackend<S> {
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<CacheKey, Entry> = CacheBuilder::new(self.capacity.0)
            .name(self.label.as_str())
            .weigher(byte_weigher)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            default_ttl: self.default_ttl,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

/// Approximate byte cost of a cache entry.
fn byte_weigher(key: &CacheKey, value: &Entry) -> u32 {
    (key.memory_size() + value.data.len() + ENTRY_OVERHEAD).min(u32::MAX as usize) as u32
}
