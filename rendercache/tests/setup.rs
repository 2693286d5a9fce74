//! Installing the cache through both entry points.

mod common;

use std::sync::Arc;

use common::{CountingRenderer, RecordingBackend, context};
use rendercache::prelude::*;
use rendercache::{ConfigError, ModuleContext, RenderHost};

struct App {
    entry: Option<RenderEntry<CountingRenderer>>,
}

impl App {
    fn new() -> Self {
        Self {
            entry: Some(RenderEntry::new(CountingRenderer::new())),
        }
    }

    fn headless() -> Self {
        Self { entry: None }
    }
}

impl RenderHost for App {
    type Renderer = CountingRenderer;

    fn render_entry(&mut self) -> Option<&mut RenderEntry<CountingRenderer>> {
        self.entry.as_mut()
    }
}

fn production() -> Installer {
    Installer::new().runtime_mode(RuntimeMode::Production)
}

fn assert_untouched(entry: &RenderEntry<CountingRenderer>, original: &Arc<CountingRenderer>) {
    assert!(!entry.is_cached());
    match entry {
        RenderEntry::Direct(renderer) => assert!(Arc::ptr_eq(renderer, original)),
        RenderEntry::Cached(_) => panic!("entry should not be wrapped"),
    }
}

#[test]
fn test_missing_cache_section_leaves_entry_untouched() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();

    let store = cache_renderer(&mut entry, &Config::default()).unwrap();

    assert!(store.is_none());
    assert_untouched(&entry, &original);
}

#[test]
fn test_empty_pages_leave_entry_untouched() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::from_yaml("version: 3\ncache:\n  is_dev: true\n  pages: []\n").unwrap();

    let store = production().install(&mut entry, &config).unwrap();

    assert!(store.is_none());
    assert_untouched(&entry, &original);
}

#[test]
fn test_non_production_mode_leaves_entry_untouched() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::builder().page("/").build();

    let store = Installer::new()
        .runtime_mode(RuntimeMode::Development)
        .install(&mut entry, &config)
        .unwrap();

    assert!(store.is_none());
    assert_untouched(&entry, &original);
}

#[test]
fn test_explicit_switch_overrides_production() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::builder().page("/").is_dev(false).build();

    assert!(production().install(&mut entry, &config).unwrap().is_none());
    assert_untouched(&entry, &original);
}

#[test]
fn test_active_config_requires_runtime() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::builder().page("/").is_dev(true).build();

    let error = cache_renderer(&mut entry, &config).unwrap_err();

    assert!(matches!(error, ConfigError::NoRuntime(_)));
    assert_untouched(&entry, &original);
}

#[tokio::test]
async fn test_invalid_pattern_is_rejected() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::builder().page_pattern("[unclosed").build();

    let error = production().install(&mut entry, &config).unwrap_err();

    assert!(matches!(error, ConfigError::InvalidPattern { .. }));
    assert_untouched(&entry, &original);
}

#[tokio::test]
async fn test_install_wraps_entry_and_returns_store() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();
    let config = Config::builder().page("/").is_dev(true).build();

    let store = cache_renderer(&mut entry, &config).unwrap().unwrap();

    assert!(entry.is_cached());
    assert!(Arc::ptr_eq(entry.renderer(), &original));
    assert!(Arc::ptr_eq(entry.cached().unwrap().backend(), &store));
    assert_eq!(store.label().as_str(), "memory");
}

#[tokio::test]
async fn test_caller_supplied_backend_is_used() {
    let backend = RecordingBackend::new();
    let shared = backend.shared();
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let config = Config::builder().page("/").build();

    let store = production()
        .backend(shared.clone())
        .install(&mut entry, &config)
        .unwrap()
        .unwrap();

    assert!(Arc::ptr_eq(&store, &shared));
}

#[tokio::test]
async fn test_reinstall_replaces_cache_layer() {
    let mut entry = RenderEntry::new(CountingRenderer::new());
    let original = entry.renderer().clone();

    production()
        .install(&mut entry, &Config::builder().page("/a").build())
        .unwrap();
    production()
        .install(&mut entry, &Config::builder().page("/b").build())
        .unwrap();

    let cached = entry.cached().unwrap();
    assert!(Arc::ptr_eq(cached.inner(), &original));
    assert!(cached.filter().is_cache_friendly("/b"));
    assert!(!cached.filter().is_cache_friendly("/a"));
}

#[tokio::test]
async fn test_register_wraps_host_entry() {
    let mut app = App::new();
    let config = Config::builder().page("/").is_dev(true).build();

    let store = register(ModuleContext::new(&mut app, &config)).unwrap();

    assert!(store.is_some());
    let entry = app.entry.as_ref().unwrap();
    assert!(entry.is_cached());

    let page = entry.render_route("/hello", &context()).await.unwrap();
    assert_eq!(page, CountingRenderer::page_for("/hello"));
}

#[tokio::test]
async fn test_register_without_renderer_is_inert() {
    let mut app = App::headless();
    let config = Config::builder().page("/").is_dev(true).build();

    let store = production()
        .register(ModuleContext {
            host: &mut app,
            options: &config,
        })
        .unwrap();

    assert!(store.is_none());
    assert!(app.entry.is_none());
}

#[tokio::test]
async fn test_register_honours_inert_config() {
    let mut app = App::new();
    let original = app.entry.as_ref().unwrap().renderer().clone();

    let store = production()
        .register(ModuleContext::new(&mut app, &Config::default()))
        .unwrap();

    assert!(store.is_none());
    assert_untouched(app.entry.as_ref().unwrap(), &original);
}
