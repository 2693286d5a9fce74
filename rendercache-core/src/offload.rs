//! Offload trait for detached background work.
//!
//! Cache population and version bookkeeping never block a render request.
//! They are handed to an [`Offload`] implementation and the request path
//! moves on without joining them.

use std::future::Future;

use smol_str::SmolStr;

use crate::CacheKey;

/// Trait for spawning detached background tasks.
///
/// # Implementations
///
/// The primary implementation is `OffloadManager` in the `rendercache`
/// crate, which runs tasks on Tokio with optional timeouts and
/// deduplication of in-flight writes.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally so that every clone shares the
/// same configuration and task registry.
///
/// # Example
///
/// ```ignore
/// use rendercache_core::Offload;
///
/// fn offload_cache_write<O: Offload>(offload: &O, key: String) {
///     offload.spawn("cache_write", async move {
///         println!("Writing to cache: {}", key);
///     });
/// }
/// ```
pub trait Offload: Send + Sync + Clone {
    /// Spawn a future to be executed in the background.
    ///
    /// * `kind` - A label categorizing the task (e.g. "version_write").
    ///   Used for tracing.
    /// * `future` - The future to execute. Its completion is never awaited
    ///   by the caller.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawn a future tied to a cache key.
    ///
    /// Implementations may skip the task when another one for the same key
    /// is still in flight. The default forwards to [`Offload::spawn`].
    fn spawn_keyed<F>(&self, kind: impl Into<SmolStr>, key: CacheKey, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = key;
        self.spawn(kind, future);
    }
}
