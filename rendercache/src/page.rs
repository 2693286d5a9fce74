//! A ready-made render result.

use rendercache_core::RenderResult;
use serde::{Deserialize, Serialize};

/// Output of a page render, as stored in the cache.
///
/// Hosts with their own result type only need to implement
/// [`RenderResult`] and serde for it; this one covers the common case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Rendered markup.
    pub html: String,
    /// Error raised while rendering, if any. Pages with an error are never
    /// stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Location the renderer redirected to instead of producing a page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirected: Option<String>,
    /// Script hashes for the `script-src` CSP directive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csp_script_src_hashes: Vec<String>,
}

impl RenderedPage {
    /// A successful page.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// A page rendered with an error.
    pub fn with_error(html: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

impl RenderResult for RenderedPage {
    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
