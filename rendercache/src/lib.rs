#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Configuration types and YAML loading.
pub mod config;

/// Installing the cache in front of a host's renderer.
pub mod entry;

/// Error types for cache setup.
pub mod error;

/// The caching wrapper around a renderer.
pub mod interceptor;

/// Cache key derivation.
pub mod key;

/// Metrics declaration.
///
/// Counters are only recorded with the `metrics` feature enabled.
pub mod metrics;

/// Detached execution of cache writes and version bookkeeping.
pub mod offload;

/// A ready-made render result.
pub mod page;

/// Store selection from configuration.
pub mod store;

/// Version-based invalidation.
pub mod version;

pub use config::{
    ActiveSettings, AppVersion, CacheSettings, Config, ConfigBuilder, MatcherConfig, RuntimeMode,
};
pub use entry::{Installer, ModuleContext, RenderEntry, RenderHost, cache_renderer, register};
pub use error::ConfigError;
pub use interceptor::CachedRenderer;
pub use key::derive_key;
pub use offload::OffloadManager;
pub use page::RenderedPage;
pub use store::{MemoryStore, MultiStore, StoreConfig};
pub use version::{VersionCheck, VersionWriter, ensure_fresh_on_startup};

pub use rendercache_backend::{Backend, BackendError, CacheBackend, Ttl};
pub use rendercache_core::{
    CacheKey, CacheStatus, NoBots, Offload, PageFilter, PageMatcher, Raw, RenderContext,
    RenderResult, Renderer, RequestInfo, UserAgentClassifier,
};

/// Convenient imports for hosts wiring the cache in.
pub mod prelude {
    pub use crate::{
        CacheStatus, Config, Installer, RenderContext, RenderEntry, RenderResult, RenderedPage,
        Renderer, RequestInfo, RuntimeMode, cache_renderer, register,
    };
}
