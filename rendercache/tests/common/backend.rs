//! In-memory backend that records every operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use rendercache::{Backend, BackendError, CacheKey, Ttl};
use rendercache_backend::{BackendLabel, BackendResult};
use rendercache_core::Raw;

/// Clones share the same store, counters and failure switches.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    store: Arc<DashMap<CacheKey, Raw>>,
    writes_per_key: Arc<DashMap<CacheKey, usize>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_resets: Arc<AtomicBool>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn Backend> {
        Arc::new(self.clone())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_resets(&self, fail: bool) {
        self.fail_resets.store(fail, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, value: &'static [u8]) {
        self.store
            .insert(CacheKey::from_route(key), Raw::from_static(value));
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.contains_key(&CacheKey::from_route(key))
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.iter().map(|e| e.key().to_string()).collect();
        keys.sort();
        keys
    }

    pub fn raw(&self, key: &str) -> Option<Raw> {
        self.store
            .get(&CacheKey::from_route(key))
            .map(|entry| entry.value().clone())
    }

    pub fn writes_for(&self, key: &str) -> usize {
        self.writes_per_key
            .get(&CacheKey::from_route(key))
            .map(|count| *count)
            .unwrap_or(0)
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

fn unavailable() -> BackendError {
    BackendError::ConnectionError(Box::new(std::io::Error::other("store unavailable")))
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn write(&self, key: &CacheKey, value: Raw, _ttl: Ttl) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        *self.writes_per_key.entry(key.clone()).or_insert(0) += 1;
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn reset(&self) -> BackendResult<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.fail_resets.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.store.clear();
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("recording")
    }
}
