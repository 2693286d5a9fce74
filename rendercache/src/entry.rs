//! Installing the cache in front of a host's renderer.
//!
//! Two entry points do the same work:
//!
//! - [`cache_renderer`] takes the render entry point and the configuration
//!   directly;
//! - [`register`] takes a [`ModuleContext`] bundling a [`RenderHost`] with
//!   its options, for hosts that hand modules a context object.
//!
//! Both replace the entry point with a [`CachedRenderer`] when caching is
//! active and return the store. When caching is off they leave the entry
//! untouched and return `None`. [`Installer`] does the same with
//! non-default collaborators.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rendercache_backend::Backend;
use rendercache_core::{NoBots, RenderContext, Renderer, UserAgentClassifier};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{Config, RuntimeMode};
use crate::error::ConfigError;
use crate::interceptor::CachedRenderer;
use crate::offload::OffloadManager;
use crate::version::{VersionWriter, guard_detached};

/// A host's render entry point, possibly wrapped by the cache.
pub enum RenderEntry<R> {
    /// The renderer as supplied by the host.
    Direct(Arc<R>),
    /// The renderer behind the cache.
    Cached(CachedRenderer<R>),
}

impl<R> RenderEntry<R> {
    /// Wraps a bare renderer.
    pub fn new(renderer: R) -> Self {
        RenderEntry::Direct(Arc::new(renderer))
    }

    /// Whether the cache is installed.
    pub fn is_cached(&self) -> bool {
        matches!(self, RenderEntry::Cached(_))
    }

    /// The host's own renderer, wrapped or not.
    pub fn renderer(&self) -> &Arc<R> {
        match self {
            RenderEntry::Direct(renderer) => renderer,
            RenderEntry::Cached(cached) => cached.inner(),
        }
    }

    /// The caching wrapper, when installed.
    pub fn cached(&self) -> Option<&CachedRenderer<R>> {
        match self {
            RenderEntry::Direct(_) => None,
            RenderEntry::Cached(cached) => Some(cached),
        }
    }
}

impl<R> From<Arc<R>> for RenderEntry<R> {
    fn from(renderer: Arc<R>) -> Self {
        RenderEntry::Direct(renderer)
    }
}

impl<R> Clone for RenderEntry<R> {
    fn clone(&self) -> Self {
        match self {
            RenderEntry::Direct(renderer) => RenderEntry::Direct(renderer.clone()),
            RenderEntry::Cached(cached) => RenderEntry::Cached(cached.clone()),
        }
    }
}

impl<R> fmt::Debug for RenderEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderEntry::Direct(_) => f.write_str("RenderEntry::Direct"),
            RenderEntry::Cached(cached) => {
                f.debug_tuple("RenderEntry::Cached").field(cached).finish()
            }
        }
    }
}

#[async_trait]
impl<R> Renderer for RenderEntry<R>
where
    R: Renderer,
    R::Output: Serialize + DeserializeOwned,
{
    type Output = R::Output;
    type Error = R::Error;

    async fn render_route(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<Self::Output, Self::Error> {
        match self {
            RenderEntry::Direct(renderer) => renderer.render_route(route, context).await,
            RenderEntry::Cached(cached) => cached.render_route(route, context).await,
        }
    }
}

/// A host application exposing its render entry point.
pub trait RenderHost {
    /// The host's renderer.
    type Renderer;

    /// The entry point to wrap, or `None` if the host has no renderer.
    fn render_entry(&mut self) -> Option<&mut RenderEntry<Self::Renderer>>;
}

/// Context handed to [`register`].
#[derive(Debug)]
pub struct ModuleContext<'a, H> {
    /// The host whose renderer is wrapped.
    pub host: &'a mut H,
    /// Cache configuration.
    pub options: &'a Config,
}

impl<'a, H> ModuleContext<'a, H> {
    /// Bundles a host with its options.
    pub fn new(host: &'a mut H, options: &'a Config) -> Self {
        Self { host, options }
    }
}

/// Sets up the cache with non-default collaborators.
///
/// ```ignore
/// let store = Installer::new()
///     .classifier(|ua: Option<&str>| ua.is_some_and(|ua| ua.contains("bot")))
///     .runtime_mode(RuntimeMode::Production)
///     .install(&mut entry, &config)?;
/// ```
#[derive(Clone)]
pub struct Installer {
    classifier: Arc<dyn UserAgentClassifier>,
    backend: Option<Arc<dyn Backend>>,
    offload: OffloadManager,
    mode: Option<RuntimeMode>,
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("backend", &self.backend.as_ref().map(|b| b.label()))
            .field("offload", &self.offload)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Installer {
    /// Default collaborators: no bots, the configured store, a fresh
    /// [`OffloadManager`], and the runtime mode from the environment.
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(NoBots),
            backend: None,
            offload: OffloadManager::default(),
            mode: None,
        }
    }

    /// Sets the user-agent classifier.
    pub fn classifier(mut self, classifier: impl UserAgentClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Uses `backend` instead of building the configured store.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Uses `offload` for detached tasks.
    pub fn offload(mut self, offload: OffloadManager) -> Self {
        self.offload = offload;
        self
    }

    /// Overrides the runtime mode instead of reading `APP_ENV`.
    pub fn runtime_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Wraps `entry` according to `config`.
    ///
    /// Returns the store when caching is active. Installing over an entry
    /// that is already cached replaces the previous cache layer.
    ///
    /// The startup version check is spawned here and not awaited.
    pub fn install<R>(
        &self,
        entry: &mut RenderEntry<R>,
        config: &Config,
    ) -> Result<Option<Arc<dyn Backend>>, ConfigError> {
        let mode = self.mode.unwrap_or_else(RuntimeMode::from_env);
        let Some(settings) = config.activate(mode)? else {
            debug!(?mode, "render cache disabled");
            return Ok(None);
        };
        tokio::runtime::Handle::try_current()?;

        let backend = match &self.backend {
            Some(backend) => backend.clone(),
            None => settings.store.into_backend()?,
        };

        self.offload.spawn_task(
            "version_check",
            guard_detached(backend.clone(), settings.version.clone()),
        );

        let pages = settings.filter.len();
        let cached = CachedRenderer::new(entry.renderer().clone(), backend.clone(), settings.filter)
            .with_offload(self.offload.clone())
            .with_classifier(self.classifier.clone())
            .with_version_writer(Arc::new(VersionWriter::new(settings.version.clone())))
            .with_host_prefix(settings.use_host_prefix);
        if entry.is_cached() {
            debug!("replacing installed render cache");
        }
        *entry = RenderEntry::Cached(cached);

        info!(
            backend = %backend.label(),
            pages,
            version = settings.version.as_deref().unwrap_or("none"),
            use_host_prefix = settings.use_host_prefix,
            "render cache installed"
        );
        Ok(Some(backend))
    }

    /// Wraps the entry point of the host in `context`.
    ///
    /// A host without a renderer leaves caching off.
    pub fn register<H>(
        &self,
        context: ModuleContext<'_, H>,
    ) -> Result<Option<Arc<dyn Backend>>, ConfigError>
    where
        H: RenderHost,
    {
        match context.host.render_entry() {
            Some(entry) => self.install(entry, context.options),
            None => {
                debug!("host has no renderer, render cache disabled");
                Ok(None)
            }
        }
    }
}

/// Wraps `entry` according to `config` with default collaborators.
///
/// See [`Installer::install`].
pub fn cache_renderer<R>(
    entry: &mut RenderEntry<R>,
    config: &Config,
) -> Result<Option<Arc<dyn Backend>>, ConfigError> {
    Installer::new().install(entry, config)
}

/// Wraps the entry point of the host in `context` with default
/// collaborators.
///
/// See [`Installer::register`].
pub fn register<H>(context: ModuleContext<'_, H>) -> Result<Option<Arc<dyn Backend>>, ConfigError>
where
    H: RenderHost,
{
    Installer::new().register(context)
}
