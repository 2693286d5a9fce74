//! The caching wrapper around a [`Renderer`].
//!
//! Every request walks the same path:
//!
//! ```text
//! start ─▶ filter ─┬─ not cache-friendly ─────────────▶ render ─▶ return   (Bypass)
//!                  └─ lookup ─┬─ hit ─────────────────────────▶ return   (Hit)
//!                             └─ miss / store error ─▶ render ─▶ store? ─▶ return   (Miss)
//! ```
//!
//! The store is an optimization only. A failed or undecodable lookup is
//! handled exactly like a miss, and writes run as detached tasks whose
//! failures are logged and dropped.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rendercache_backend::{Backend, BackendError, CacheBackend, FormatExt, Ttl};
use rendercache_core::{
    BackendLabel, CacheKey, CacheStatus, NoBots, Offload, PageFilter, RenderContext,
    RenderResult, Renderer, UserAgentClassifier,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::key::derive_key;
use crate::metrics::{record_backend_error, record_status};
use crate::offload::OffloadManager;
use crate::version::VersionWriter;

/// A [`Renderer`] that answers from the store when it can.
///
/// Created by [`Installer`](crate::Installer) from configuration, or
/// directly with [`CachedRenderer::new`] and the `with_*` methods.
pub struct CachedRenderer<R, O = OffloadManager> {
    inner: Arc<R>,
    backend: Arc<dyn Backend>,
    label: BackendLabel,
    filter: Arc<PageFilter>,
    classifier: Arc<dyn UserAgentClassifier>,
    version: Arc<VersionWriter>,
    use_host_prefix: bool,
    offload: O,
}

impl<R> CachedRenderer<R, OffloadManager> {
    /// Wraps `inner`, caching routes accepted by `filter` in `backend`.
    ///
    /// No version is recorded, keys are plain routes, and no request is
    /// classified as a bot until configured otherwise.
    pub fn new(inner: Arc<R>, backend: Arc<dyn Backend>, filter: PageFilter) -> Self {
        let label = backend.label();
        Self {
            inner,
            backend,
            label,
            filter: Arc::new(filter),
            classifier: Arc::new(NoBots),
            version: Arc::new(VersionWriter::new(None)),
            use_host_prefix: false,
            offload: OffloadManager::default(),
        }
    }
}

impl<R, O> CachedRenderer<R, O> {
    /// Replaces the executor for detached writes.
    pub fn with_offload<O2: Offload>(self, offload: O2) -> CachedRenderer<R, O2> {
        CachedRenderer {
            inner: self.inner,
            backend: self.backend,
            label: self.label,
            filter: self.filter,
            classifier: self.classifier,
            version: self.version,
            use_host_prefix: self.use_host_prefix,
            offload,
        }
    }

    /// Sets the user-agent classifier used for host-prefixed keys.
    pub fn with_classifier(mut self, classifier: Arc<dyn UserAgentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Sets the version recorded in the store by the first request.
    pub fn with_version_writer(mut self, version: Arc<VersionWriter>) -> Self {
        self.version = version;
        self
    }

    /// Namespaces keys by hostname and bot classification.
    pub fn with_host_prefix(mut self, enabled: bool) -> Self {
        self.use_host_prefix = enabled;
        self
    }

    /// The wrapped renderer.
    pub fn inner(&self) -> &Arc<R> {
        &self.inner
    }

    /// The store pages are cached in.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The cache-friendliness filter.
    pub fn filter(&self) -> &PageFilter {
        &self.filter
    }

    /// The lazy version writer.
    pub fn version_writer(&self) -> &Arc<VersionWriter> {
        &self.version
    }

    /// The executor for detached writes.
    pub fn offload(&self) -> &O {
        &self.offload
    }
}

impl<R, O: Clone> Clone for CachedRenderer<R, O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            backend: self.backend.clone(),
            label: self.label.clone(),
            filter: self.filter.clone(),
            classifier: self.classifier.clone(),
            version: self.version.clone(),
            use_host_prefix: self.use_host_prefix,
            offload: self.offload.clone(),
        }
    }
}

impl<R, O> fmt::Debug for CachedRenderer<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedRenderer")
            .field("backend", &self.label)
            .field("filter", &self.filter)
            .field("version", &self.version)
            .field("use_host_prefix", &self.use_host_prefix)
            .finish_non_exhaustive()
    }
}

impl<R, O> CachedRenderer<R, O>
where
    R: Renderer,
    R::Output: Serialize + DeserializeOwned,
    O: Offload,
{
    /// Renders `route`, reporting whether the result came from the store.
    ///
    /// Renderer errors are returned unchanged. Store errors never are.
    pub async fn render_with_status(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<(R::Output, CacheStatus), R::Error> {
        let is_bot = self.classifier.is_bot(context.req.user_agent());
        let key = derive_key(route, &context.req, is_bot, self.use_host_prefix);

        // The startup reset is detached too. A request arriving right after
        // setup can write the version record or a page before the reset
        // lands and lose it to the reset. Lost pages are rendered again on
        // the next miss; a lost record costs one extra reset at next start.
        if self.version.is_pending() {
            let version = self.version.clone();
            let backend = self.backend.clone();
            self.offload.spawn("version_write", async move {
                version.try_persist(backend.as_ref()).await;
            });
        }

        if !self.filter.is_cache_friendly(route) {
            debug!(route, "route not cache-friendly, bypassing");
            let output = self.inner.render_route(route, context).await?;
            record_status(CacheStatus::Bypass, self.label.as_str());
            return Ok((output, CacheStatus::Bypass));
        }

        if let Some(cached) = self.lookup(&key).await {
            debug!(key = %key, "cache hit");
            record_status(CacheStatus::Hit, self.label.as_str());
            return Ok((cached, CacheStatus::Hit));
        }

        let output = self.inner.render_route(route, context).await?;
        record_status(CacheStatus::Miss, self.label.as_str());
        if output.has_error() {
            debug!(key = %key, "render reported an error, not caching");
        } else {
            self.populate(key, &output);
        }
        Ok((output, CacheStatus::Miss))
    }

    /// Reads the key, turning every failure into a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<R::Output> {
        match self.backend.get::<R::Output>(key).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                debug!(key = %key, "cache miss");
                None
            }
            Err(BackendError::FormatError(error)) => {
                warn!(key = %key, error = %error, "stored page is unreadable, rendering");
                None
            }
            Err(error) => {
                record_backend_error("read", self.label.as_str());
                warn!(key = %key, error = %error, "cache lookup failed, rendering");
                None
            }
        }
    }

    /// Serializes the page now and writes it in a detached task.
    fn populate(&self, key: CacheKey, output: &R::Output) {
        let raw = match FormatExt::serialize(self.backend.value_format(), output) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %key, error = %error, "failed to serialize rendered page");
                return;
            }
        };

        let backend = self.backend.clone();
        let task_key = key.clone();
        self.offload.spawn_keyed("cache_write", key, async move {
            if let Err(error) = backend.write(&task_key, raw, Ttl::Default).await {
                record_backend_error("write", backend.label().as_str());
                warn!(key = %task_key, error = %error, "failed to store rendered page");
            }
        });
    }
}

#[async_trait]
impl<R, O> Renderer for CachedRenderer<R, O>
where
    R: Renderer,
    R::Output: Serialize + DeserializeOwned,
    O: Offload,
{
    type Output = R::Output;
    type Error = R::Error;

    async fn render_route(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<Self::Output, Self::Error> {
        self.render_with_status(route, context)
            .await
            .map(|(output, _)| output)
    }
}
