//! OffloadManager implementation for background task execution.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rendercache_core::{CacheKey, Offload};
use smol_str::SmolStr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};

#[cfg(feature = "metrics")]
use crate::metrics::{OFFLOAD_TASKS_DEDUPLICATED, OFFLOAD_TASKS_SPAWNED, OFFLOAD_TASKS_TIMEOUT};

/// Identity of a detached task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OffloadKey {
    /// Write of a cache entry. Only one per key is kept in flight.
    Cache(CacheKey),
    /// Any other task, numbered within its kind.
    Generated {
        /// Kind of the task, e.g. `"version_write"`.
        kind: SmolStr,
        /// Unique identifier within the kind.
        id: u64,
    },
}

impl OffloadKey {
    /// Label used in spans and metrics: `"cache"` or the task kind.
    pub fn key_type(&self) -> SmolStr {
        match self {
            Self::Cache(_) => SmolStr::new_static("cache"),
            Self::Generated { kind, .. } => kind.clone(),
        }
    }
}

impl From<CacheKey> for OffloadKey {
    fn from(key: CacheKey) -> Self {
        Self::Cache(key)
    }
}

/// Handle to a spawned task.
#[derive(Debug)]
pub struct OffloadHandle {
    handle: JoinHandle<()>,
    generation: u64,
}

impl OffloadHandle {
    /// Whether the task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

#[derive(Debug)]
struct Inner {
    config: OffloadConfig,
    tasks: DashMap<OffloadKey, OffloadHandle>,
    key_counter: AtomicU64,
    generation: AtomicU64,
}

/// Runs detached tasks on the current Tokio runtime.
///
/// Clones share the same task registry. Must be used from within a Tokio
/// runtime: spawning outside of one panics, which is why setup checks for
/// a runtime before installing the cache.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<Inner>,
}

impl OffloadManager {
    /// Create a manager with the given configuration.
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                tasks: DashMap::new(),
                key_counter: AtomicU64::new(0),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Create a manager with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(OffloadConfig::default())
    }

    fn next_key(&self, kind: impl Into<SmolStr>) -> OffloadKey {
        let id = self.inner.key_counter.fetch_add(1, Ordering::Relaxed);
        OffloadKey::Generated {
            kind: kind.into(),
            id,
        }
    }

    /// Spawn a task under a fresh key of the given kind.
    pub fn spawn_task<F>(&self, kind: impl Into<SmolStr>, task: F) -> OffloadKey
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = self.next_key(kind);
        self.spawn_with_key(key.clone(), task);
        key
    }

    /// Spawn a task under a specific key.
    ///
    /// Returns `false` when the task was skipped because a cache write for
    /// the same key is still in flight and deduplication is enabled.
    pub fn spawn_with_key<K, F>(&self, key: K, task: F) -> bool
    where
        K: Into<OffloadKey>,
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();

        if self.inner.config.deduplicate
            && matches!(key, OffloadKey::Cache(_))
            && self.is_in_flight(&key)
        {
            debug!(?key, "write already in flight, skipping");
            #[cfg(feature = "metrics")]
            metrics::counter!(*OFFLOAD_TASKS_DEDUPLICATED).increment(1);
            return false;
        }

        #[cfg(feature = "metrics")]
        metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "key_type" => key.key_type().to_string())
            .increment(1);

        let (handle, registered) = self.spawn_inner(key.clone(), task);
        self.inner.tasks.insert(key, handle);
        // The task only runs once its handle is in the registry, so its
        // removal step always finds it.
        let _ = registered.send(());
        true
    }

    /// Number of tasks that have not finished yet.
    pub fn active_task_count(&self) -> usize {
        self.inner
            .tasks
            .iter()
            .filter(|entry| !entry.is_finished())
            .count()
    }

    /// Whether a task with the given key is still running.
    pub fn is_in_flight(&self, key: &OffloadKey) -> bool {
        self.inner
            .tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drop handles of finished tasks.
    pub fn cleanup_finished(&self) {
        self.inner.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Abort every tracked task.
    pub fn cancel_all(&self) {
        for entry in self.inner.tasks.iter() {
            entry.abort();
        }
    }

    /// Wait until every tracked task has finished.
    pub async fn wait_all(&self) {
        loop {
            self.cleanup_finished();
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Wait for every tracked task, giving up after `timeout`.
    ///
    /// Returns `true` if all tasks completed in time.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }

    /// Spawns `task` held back until the returned sender fires or drops.
    fn spawn_inner<F>(&self, key: OffloadKey, task: F) -> (OffloadHandle, oneshot::Sender<()>)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let policy = self.inner.config.timeout_policy;
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.clone();
        let span = info_span!("offload_task", key_type = %key.key_type(), key = ?key);
        let (registered, gate) = oneshot::channel::<()>();

        let handle = tokio::spawn(
            async move {
                let _ = gate.await;
                let start = Instant::now();
                match policy {
                    TimeoutPolicy::None => task.await,
                    TimeoutPolicy::Cancel(limit) => {
                        if tokio::time::timeout(limit, task).await.is_err() {
                            warn!(?key, limit_ms = limit.as_millis(), "task cancelled after timeout");
                            #[cfg(feature = "metrics")]
                            metrics::counter!(*OFFLOAD_TASKS_TIMEOUT).increment(1);
                        }
                    }
                    TimeoutPolicy::Warn(limit) => {
                        task.await;
                        let elapsed = start.elapsed();
                        if elapsed > limit {
                            warn!(
                                ?key,
                                elapsed_ms = elapsed.as_millis(),
                                threshold_ms = limit.as_millis(),
                                "task exceeded timeout threshold"
                            );
                        }
                    }
                }
                debug!(elapsed_ms = start.elapsed().as_millis(), "task finished");
                // A newer task may have taken over the key.
                inner
                    .tasks
                    .remove_if(&key, |_, handle| handle.generation == generation);
            }
            .instrument(span),
        );

        (OffloadHandle { handle, generation }, registered)
    }
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Offload for OffloadManager {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn_task(kind, future);
    }

    fn spawn_keyed<F>(&self, kind: impl Into<SmolStr>, key: CacheKey, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let kind = kind.into();
        if !self.spawn_with_key(key.clone(), future) {
            debug!(%kind, %key, "keyed task deduplicated");
        }
    }
}
