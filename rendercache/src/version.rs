//! Version-based invalidation.
//!
//! The store keeps a single record under [`CacheKey::version_record`] naming
//! the application version whose pages it holds. At startup the record is
//! compared with the running version and the whole store is dropped when
//! they differ. The running version is then recorded lazily by the first
//! request, see [`VersionWriter`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rendercache_backend::{Backend, BackendError, BackendResult, CacheBackend, Ttl};
use rendercache_core::CacheKey;
use smol_str::SmolStr;
use tracing::{debug, info, warn};

use crate::metrics::{record_backend_error, record_version_reset};

/// What the startup check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// No version configured; the store was not consulted.
    Skipped,
    /// The store already holds pages of this version.
    Current,
    /// The store held another version (or none) and was reset.
    Reset {
        /// Previously recorded version, if any.
        previous: Option<String>,
    },
}

/// Drops the whole store when it holds pages of another version.
///
/// A missing record counts as a mismatch. The new version is not written
/// here; [`VersionWriter`] does that on the first request.
///
/// A record that fails to decode is treated as absent.
pub async fn ensure_fresh_on_startup<B>(
    backend: &B,
    version: Option<&str>,
) -> BackendResult<VersionCheck>
where
    B: Backend + ?Sized,
{
    let Some(version) = version.filter(|v| !v.is_empty()) else {
        return Ok(VersionCheck::Skipped);
    };

    let key = CacheKey::version_record();
    let previous: Option<String> = match backend.get(&key).await {
        Ok(stored) => stored,
        Err(BackendError::FormatError(error)) => {
            debug!(error = %error, "unreadable version record");
            None
        }
        Err(error) => return Err(error),
    };

    if previous.as_deref() == Some(version) {
        debug!(version, "store holds current version");
        return Ok(VersionCheck::Current);
    }

    backend.reset().await?;
    record_version_reset();
    info!(
        "Cache updated from {} to {}",
        previous.as_deref().unwrap_or("none"),
        version
    );
    Ok(VersionCheck::Reset { previous })
}

/// Records the running version in the store, once per process.
///
/// [`try_persist`](Self::try_persist) is called on every request. Until one
/// write succeeds each call tries again; afterwards calls return at once.
/// Concurrent first requests may each write the record, which is harmless.
#[derive(Debug)]
pub struct VersionWriter {
    version: Option<SmolStr>,
    saved: AtomicBool,
}

impl VersionWriter {
    /// Creates a writer for the given version. Empty means no version.
    pub fn new(version: Option<SmolStr>) -> Self {
        Self {
            version: version.filter(|v| !v.is_empty()),
            saved: AtomicBool::new(false),
        }
    }

    /// The version this writer records.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Whether the version has been written by this process.
    pub fn is_saved(&self) -> bool {
        self.saved.load(Ordering::Acquire)
    }

    /// Whether a call to [`try_persist`](Self::try_persist) would write.
    pub fn is_pending(&self) -> bool {
        self.version.is_some() && !self.is_saved()
    }

    /// Writes the version record without expiry unless already done.
    pub async fn try_persist<B>(&self, backend: &B)
    where
        B: Backend + ?Sized,
    {
        let Some(version) = self.version.as_deref() else {
            return;
        };
        if self.is_saved() {
            return;
        }

        match backend
            .set(&CacheKey::version_record(), &version, Ttl::Persistent)
            .await
        {
            Ok(()) => {
                self.saved.store(true, Ordering::Release);
                debug!(version, "version recorded");
            }
            Err(error) => {
                record_backend_error("version_write", backend.label().as_str());
                warn!(version, error = %error, "failed to record version");
            }
        }
    }
}

/// Runs [`ensure_fresh_on_startup`] and logs failures instead of returning
/// them. Used for the detached startup check.
pub(crate) async fn guard_detached(backend: Arc<dyn Backend>, version: Option<SmolStr>) {
    if let Err(error) = ensure_fresh_on_startup(backend.as_ref(), version.as_deref()).await {
        record_backend_error("version_check", backend.label().as_str());
        warn!(error = %error, "startup version check failed");
    }
}
