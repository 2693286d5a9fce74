//! The page-rendering collaborator.
//!
//! The cache never renders anything itself. It wraps a [`Renderer`] and
//! decides, per request, whether calling it can be skipped.

use std::sync::Arc;

use async_trait::async_trait;

use crate::request::RenderContext;

/// A value produced by a renderer.
///
/// Only results without an error flag are eligible for storage.
pub trait RenderResult {
    /// Whether an error occurred while rendering this result.
    fn has_error(&self) -> bool;
}

/// Trait for rendering a route into a result.
///
/// This is the entry point the cache wraps. A failed render is reported as
/// `Err` and handed back to the caller unchanged; a rendered error page is
/// reported as `Ok` with [`RenderResult::has_error`] returning `true`.
///
/// # Examples
///
/// ```rust,ignore
/// use rendercache_core::{RenderContext, Renderer};
///
/// struct StaticRenderer;
///
/// #[async_trait::async_trait]
/// impl Renderer for StaticRenderer {
///     type Output = MyPage;
///     type Error = std::io::Error;
///
///     async fn render_route(&self, route: &str, _: &RenderContext) -> Result<MyPage, Self::Error> {
///         Ok(MyPage::new(format!("<h1>{route}</h1>")))
///     }
/// }
/// ```
#[async_trait]
pub trait Renderer: Send + Sync {
    /// The rendered result.
    type Output: RenderResult + Send;

    /// Failure raised by the renderer.
    type Error: Send;

    /// Render the given route for the given request.
    async fn render_route(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<Self::Output, Self::Error>;
}

#[async_trait]
impl<R> Renderer for Arc<R>
where
    R: Renderer + ?Sized,
{
    type Output = R::Output;
    type Error = R::Error;

    async fn render_route(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<Self::Output, Self::Error> {
        self.as_ref().render_route(route, context).await
    }
}

#[async_trait]
impl<R> Renderer for Box<R>
where
    R: Renderer + ?Sized,
{
    type Output = R::Output;
    type Error = R::Error;

    async fn render_route(
        &self,
        route: &str,
        context: &RenderContext,
    ) -> Result<Self::Output, Self::Error> {
        self.as_ref().render_route(route, context).await
    }
}
