use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use rendercache_core::{BackendLabel, CacheKey, Raw};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    BackendError,
    format::{Format, FormatExt, JsonFormat},
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Expiration requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the store's own default expiration, if it has one.
    #[default]
    Default,
    /// Keep the entry until it is reset or evicted for capacity.
    Persistent,
    /// Expire the entry after the given duration.
    Expires(Duration),
}

impl Ttl {
    /// Resolves the expiration against a store-wide default.
    pub fn resolve(self, default: Option<Duration>) -> Option<Duration> {
        match self {
            Ttl::Default => default,
            Ttl::Persistent => None,
            Ttl::Expires(duration) => Some(duration),
        }
    }
}

/// Abstract async key-value store.
///
/// Stores only move bytes around. Encoding render results is handled by
/// [`CacheBackend`] using the store's [`Backend::value_format`].
#[async_trait]
pub trait Backend: Sync + Send {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>>;

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()>;

    /// Drops every entry, the version record included.
    async fn reset(&self) -> BackendResult<()>;

    /// Returns the label of this store, used in logs and tiered names.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("label", &self.label()).finish()
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        (*self).write(key, value, ttl).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (*self).reset().await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }
}

#[async_trait]
impl<B> Backend for Box<B>
where
    B: Backend + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (**self).reset().await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

#[async_trait]
impl<B> Backend for Arc<B>
where
    B: Backend + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (**self).reset().await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

/// High-level cache backend trait with typed operations.
///
/// `get` and `set` run values through the store's format so callers deal
/// in render results rather than bytes.
pub trait CacheBackend: Backend {
    fn get<T>(&self, key: &CacheKey) -> impl Future<Output = BackendResult<Option<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.read(key).await? {
                Some(raw) => {
                    let value = self.value_format().deserialize::<T>(&raw)?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    fn set<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Ttl,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let raw = self.value_format().serialize(value)?;
            self.write(key, raw, ttl).await
        }
    }
}

impl<B: Backend + ?Sized> CacheBackend for B {}
