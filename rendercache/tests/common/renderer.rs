//! Renderer double that counts invocations.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rendercache::{RenderContext, RenderedPage, Renderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailed(pub String);

/// Renders `<p>{route}</p>`.
///
/// Routes containing `broken` produce a page with its error flag set;
/// routes containing `crash` fail outright.
#[derive(Debug, Default)]
pub struct CountingRenderer {
    calls: AtomicUsize,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn page_for(route: &str) -> RenderedPage {
        if route.contains("broken") {
            RenderedPage::with_error(format!("<p>{route}</p>"), "template error")
        } else {
            RenderedPage::new(format!("<p>{route}</p>"))
        }
    }
}

#[async_trait]
impl Renderer for CountingRenderer {
    type Output = RenderedPage;
    type Error = RenderFailed;

    async fn render_route(
        &self,
        route: &str,
        _context: &RenderContext,
    ) -> Result<RenderedPage, RenderFailed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if route.contains("crash") {
            return Err(RenderFailed(route.to_owned()));
        }
        Ok(Self::page_for(route))
    }
}
