//! Simple in-memory test backends using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use rendercache_backend::{Backend, BackendError, BackendLabel, BackendResult, Ttl};
use rendercache_core::{CacheKey, Raw};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory backend that counts operations.
///
/// Cheap to clone; clones share the same store and counters.
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<CacheKey, (Raw, Ttl)>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
    label: &'static str,
}

#[allow(dead_code)]
impl TestBackend {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key)
    }

    pub fn ttl_of(&self, key: &CacheKey) -> Option<Ttl> {
        self.store.get(key).map(|entry| entry.1)
    }

    pub fn insert(&self, key: &CacheKey, value: &'static [u8]) {
        self.store
            .insert(key.clone(), (Raw::from_static(value), Ttl::Default));
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.get(key).map(|entry| entry.0.clone()))
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.insert(key.clone(), (value, ttl));
        Ok(())
    }

    async fn reset(&self) -> BackendResult<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.store.clear();
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static(self.label)
    }
}

/// Backend that always returns errors (for error testing).
#[derive(Clone, Default)]
pub struct ErrorBackend;

fn simulated() -> BackendError {
    BackendError::InternalError(Box::new(std::io::Error::other("simulated error")))
}

#[async_trait]
impl Backend for ErrorBackend {
    async fn read(&self, _key: &CacheKey) -> BackendResult<Option<Raw>> {
        Err(simulated())
    }

    async fn write(&self, _key: &CacheKey, _value: Raw, _ttl: Ttl) -> BackendResult<()> {
        Err(simulated())
    }

    async fn reset(&self) -> BackendResult<()> {
        Err(simulated())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("error")
    }
}

/// Backend that stores like [`TestBackend`] but refuses to reset.
#[derive(Clone)]
pub struct StickyBackend(pub TestBackend);

#[async_trait]
impl Backend for StickyBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        self.0.read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Ttl) -> BackendResult<()> {
        self.0.write(key, value, ttl).await
    }

    async fn reset(&self) -> BackendResult<()> {
        Err(simulated())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("sticky")
    }
}
