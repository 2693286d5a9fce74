//! Store selection.
//!
//! The cache talks to a single [`Backend`]. Configuration picks which one:
//! a bounded in-memory store, or several stores layered into one
//! [`MultiBackend`].

use std::sync::Arc;
use std::time::Duration;

use rendercache_backend::{Backend, MultiBackend};
use rendercache_moka::MokaBackend;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default capacity of the in-memory store.
pub const DEFAULT_MAX_ENTRIES: u64 = 500;

fn default_max_entries() -> u64 {
    DEFAULT_MAX_ENTRIES
}

/// In-memory store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    /// Maximum number of stored pages.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Expiration of stored pages, e.g. `10m`. None keeps pages until
    /// evicted or reset. The version record never expires.
    #[serde(default, with = "humantime_serde")]
    pub ttl: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: None,
        }
    }
}

/// Layered store settings. The first store is read first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStore {
    /// Stores in read order.
    pub stores: Vec<StoreConfig>,
}

/// Which store backs the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Bounded in-process store.
    Memory(MemoryStore),
    /// Several stores combined into one.
    Multi(MultiStore),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory(MemoryStore::default())
    }
}

impl StoreConfig {
    /// Builds the configured store.
    pub fn into_backend(self) -> Result<Arc<dyn Backend>, ConfigError> {
        match self {
            StoreConfig::Memory(memory) => {
                let mut builder = MokaBackend::builder()
                    .label("memory")
                    .max_entries(memory.max_entries);
                if let Some(ttl) = memory.ttl {
                    builder = builder.default_ttl(ttl);
                }
                Ok(Arc::new(builder.build()))
            }
            StoreConfig::Multi(multi) => {
                if multi.stores.is_empty() {
                    return Err(ConfigError::EmptyStoreList);
                }
                let tiers = multi
                    .stores
                    .into_iter()
                    .map(StoreConfig::into_backend)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Arc::new(MultiBackend::new(tiers)))
            }
        }
    }
}
