//! Metrics declaration.
//!
//! Counters are registered with the `metrics` facade on first use; install
//! any `metrics` recorder to collect them.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Requests answered from the store.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rendercache_hit_total",
            "Total number of requests answered from the cache."
        );
        "rendercache_hit_total"
    };
    /// Cache-friendly requests that had to be rendered.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rendercache_miss_total",
            "Total number of cache-friendly requests that were rendered."
        );
        "rendercache_miss_total"
    };
    /// Requests for routes outside the configured pages.
    pub static ref CACHE_BYPASS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rendercache_bypass_total",
            "Total number of requests for routes that are never cached."
        );
        "rendercache_bypass_total"
    };
    /// Store operations that failed and were absorbed.
    pub static ref BACKEND_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rendercache_backend_errors_total",
            "Total number of failed store operations."
        );
        "rendercache_backend_errors_total"
    };
    /// Store resets caused by a version change.
    pub static ref VERSION_RESET_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rendercache_version_reset_total",
            "Total number of store resets caused by an application version change."
        );
        "rendercache_version_reset_total"
    };

    /// Detached tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "rendercache_offload_tasks_spawned_total",
            "Total number of detached tasks spawned."
        );
        "rendercache_offload_tasks_spawned_total"
    };
    /// Keyed writes skipped because one was already in flight.
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "rendercache_offload_tasks_deduplicated_total",
            "Total number of cache writes skipped because one was already in flight."
        );
        "rendercache_offload_tasks_deduplicated_total"
    };
    /// Detached tasks cancelled by the timeout policy.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "rendercache_offload_tasks_timeout_total",
            "Total number of detached tasks cancelled after a timeout."
        );
        "rendercache_offload_tasks_timeout_total"
    };
}

/// Records the outcome of one intercepted render.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_status(status: rendercache_core::CacheStatus, backend: &str) {
    use rendercache_core::CacheStatus;

    let name = match status {
        CacheStatus::Hit => *CACHE_HIT_COUNTER,
        CacheStatus::Miss => *CACHE_MISS_COUNTER,
        CacheStatus::Bypass => *CACHE_BYPASS_COUNTER,
    };
    metrics::counter!(name, "backend" => backend.to_owned()).increment(1);
}

/// Records the outcome of one intercepted render.
#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_status(_status: rendercache_core::CacheStatus, _backend: &str) {}

/// Records a failed store operation.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_backend_error(operation: &'static str, backend: &str) {
    metrics::counter!(
        *BACKEND_ERROR_COUNTER,
        "operation" => operation,
        "backend" => backend.to_owned()
    )
    .increment(1);
}

/// Records a failed store operation.
#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_backend_error(_operation: &'static str, _backend: &str) {}

/// Records a version-triggered store reset.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_version_reset() {
    metrics::counter!(*VERSION_RESET_COUNTER).increment(1);
}

/// Records a version-triggered store reset.
#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_version_reset() {}
