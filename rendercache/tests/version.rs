//! Version-triggered invalidation, directly and through setup.

mod common;

use common::{CountingRenderer, LogCapture, RecordingBackend, context};
use pretty_assertions::assert_eq;
use rendercache::prelude::*;
use rendercache::{CacheBackend, CacheKey, OffloadManager, Ttl, VersionCheck, ensure_fresh_on_startup};
use rendercache_backend::MultiBackend;

async fn store_holding(version: &str) -> RecordingBackend {
    let backend = RecordingBackend::new();
    backend
        .set(&CacheKey::version_record(), &version, Ttl::Persistent)
        .await
        .unwrap();
    backend.insert_raw("/blog/a", b"{\"html\":\"old\"}");
    backend
}

#[tokio::test]
async fn test_version_change_resets_and_logs_once() {
    let backend = store_holding("1.0.0").await;
    let (logs, _guard) = LogCapture::install();

    let check = ensure_fresh_on_startup(&backend, Some("1.0.1"))
        .await
        .unwrap();

    assert_eq!(
        check,
        VersionCheck::Reset {
            previous: Some("1.0.0".to_owned())
        }
    );
    assert_eq!(backend.resets(), 1);
    assert!(!backend.has("/blog/a"));
    assert_eq!(logs.count_containing("Cache updated from 1.0.0 to 1.0.1"), 1);
}

#[tokio::test]
async fn test_same_version_keeps_store() {
    let backend = store_holding("1.0.1").await;
    let (logs, _guard) = LogCapture::install();

    let check = ensure_fresh_on_startup(&backend, Some("1.0.1"))
        .await
        .unwrap();

    assert_eq!(check, VersionCheck::Current);
    assert_eq!(backend.resets(), 0);
    assert!(backend.has("/blog/a"));
    assert_eq!(logs.count_containing("Cache updated"), 0);
}

#[tokio::test]
async fn test_guard_does_not_write_version() {
    let backend = RecordingBackend::new();

    ensure_fresh_on_startup(&backend, Some("2")).await.unwrap();

    assert_eq!(backend.writes(), 0);
    assert_eq!(backend.resets(), 1);
}

#[tokio::test]
async fn test_partial_reset_is_not_reported_as_reset() {
    let front = RecordingBackend::new();
    let back = store_holding("1.0.0").await;
    back.fail_resets(true);
    let tiered = MultiBackend::new(vec![front.shared(), back.shared()]);
    let (logs, _guard) = LogCapture::install();

    let result = ensure_fresh_on_startup(&tiered, Some("1.0.1")).await;

    assert!(result.is_err());
    assert!(back.has("/blog/a"));
    assert_eq!(logs.count_containing("Cache updated"), 0);
}

async fn start(backend: &RecordingBackend, version: &str) -> RenderEntry<CountingRenderer> {
    let offload = OffloadManager::default();
    let mut entry = RenderEntry::new(CountingRenderer::new());
    Installer::new()
        .backend(backend.shared())
        .offload(offload.clone())
        .runtime_mode(RuntimeMode::Production)
        .install(
            &mut entry,
            &Config::builder().version(version).page("/blog").build(),
        )
        .unwrap();
    offload.wait_all().await;

    entry.render_route("/blog/a", &context()).await.unwrap();
    offload.wait_all().await;
    entry
}

#[tokio::test]
async fn test_restarts_reset_only_on_new_version() {
    let backend = store_holding("1.0.0").await;
    let (logs, _guard) = LogCapture::install();

    start(&backend, "1.0.1").await;
    assert_eq!(backend.resets(), 1);

    start(&backend, "1.0.1").await;
    assert_eq!(backend.resets(), 1);
    assert_eq!(logs.count_containing("Cache updated from 1.0.0 to 1.0.1"), 1);

    start(&backend, "1.0.2").await;
    assert_eq!(backend.resets(), 2);
    assert_eq!(logs.count_containing("Cache updated from 1.0.1 to 1.0.2"), 1);
}

#[tokio::test]
async fn test_failed_startup_check_is_logged_not_raised() {
    let backend = store_holding("1.0.0").await;
    backend.fail_reads(true);
    let (logs, _guard) = LogCapture::install();

    let entry = start(&backend, "1.0.1").await;

    assert!(entry.is_cached());
    assert_eq!(backend.resets(), 0);
    assert_eq!(logs.count_containing("startup version check failed"), 1);
}
