//! Tiered store that combines several backends into one.
//!
//! Tiers are ordered from fastest to slowest (e.g. in-process memory first,
//! a shared store last).
//!
//! # Read Strategy
//! 1. Check tiers in order → first hit wins
//! 2. On a hit in a later tier, earlier tiers are refilled with the value.
//!    Refills use each tier's default expiration, except for the version
//!    record, which stays persistent
//! 3. A failing tier is skipped; the read fails only when every tier fails
//!
//! # Write Strategy
//! - Writes go to every tier in parallel
//! - Succeeds if at least one tier accepts the write; failures are logged
//!
//! # Reset Strategy
//! - Resets every tier in parallel and fails if any tier fails
//!
//! All tiers receive the same bytes, so they should agree on the value
//! format. The first tier's format is the one reported.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use rendercache_backend::MultiBackend;
//! use rendercache_moka::MokaBackend;
//!
//! let small = MokaBackend::builder().max_entries(100).build();
//! let large = MokaBackend::builder().max_entries(10_000).build();
//! let backend = MultiBackend::new(vec![Arc::new(small), Arc::new(large)]);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rendercache_core::{BackendLabel, CacheKey, Raw};
use tracing::{debug, warn};

use crate::format::{Format, JsonFormat};
use crate::{Backend, BackendError, BackendResult, Ttl};

/// Backend composed of ordered tiers.
#[derive(Clone)]
pub struct MultiBackend {
    tiers: Vec<Arc<dyn Backend>>,
    label: BackendLabel,
}

impl std::fmt::Debug for MultiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tiers: Vec<BackendLabel> = self.tiers.iter().map(|tier| tier.label()).collect();
        f.debug_struct("MultiBackend")
            .field("label", &self.label)
            .field("tiers", &tiers)
            .finish()
    }
}

impl MultiBackend {
    /// Creates a tiered backend. The first tier is checked first.
    pub fn new(tiers: Vec<Arc<dyn Backend>>) -> Self {
        Self {
            tiers,
            label: BackendLabel::new_static("multi"),
        }
    }

    /// Sets a custom label.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// The composed tiers in read order.
    pub fn tiers(&self) -> &[Arc<dyn Backend>] {
        &self.tiers
    }

    /// Collapses per-tier results.
    ///
    /// With `require_all` every tier must succeed; otherwise one success is
    /// enough.
    fn settle(
        &self,
        operation: &'static str,
        results: Vec<BackendResult<()>>,
        require_all: bool,
    ) -> BackendResult<()> {
        let mut succeeded = false;
        let mut last_error = None;
        for (tier, result) in self.tiers.iter().zip(results) {
            match result {
                Ok(()) => succeeded = true,
                Err(error) => {
                    warn!(
                        backend = %self.label.compose(&tier.label()),
                        operation,
                        error = %error,
                        "tier operation failed"
                    );
                    last_error = Some(error);
                }
            }
        }
        match last_error {
            Some(error) if require_all || !succeeded => Err(error),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MultiBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        let mut last_error: Option<BackendError> = None;
        let mut failed = 0;

        for (index, tier) in self.tiers.iter().enumerate() {
            match tier.read(key).await {
                Ok(Some(value)) => {
                    let ttl = if *key == CacheKey::version_record() {
                        Ttl::Persistent
                    } else {
                        Ttl::Default
                    };
                    for earlier in &self.tiers[..index] {
                        if let Err(error) = earlier.write(key, value.clone(), ttl).await {
                            warn!(
                                backend = %self.label.compose(&earlier.label()),
                                key = %key,
                                error = %error,
                                "tier refill failed"
                            );
                        }
                    }
                    debug!(backend = %self.label.compose(&tier.label()), key = %key, "tier hit");
                    return Ok(Some(value));
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        backend = %self.label.compose(&tier.label()),
                        key = %key,
                        error = %error,
                        "tier read failed"
                    );
                    failed += 1;
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) if failed == self.tiers.len() => Err(error),
            _ => Ok(None),
        }
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        let results = join_all(
            self.tiers
                .iter()
                .map(|tier| tier.write(key, value.clone(), ttl)),
        )
        .await;
        self.settle("write", results, false)
    }

    async fn reset(&self) -> BackendResult<()> {
        let results = join_all(self.tiers.iter().map(|tier| tier.reset())).await;
        self.settle("reset", results, true)
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        match self.tiers.first() {
            Some(tier) => tier.value_format(),
            None => &JsonFormat,
        }
    }
}
