//! Request context handed to the renderer.
//!
//! The cache only reads three things from a request: the hostname (for
//! host-prefixed keys), the `User-Agent` header (for bot namespacing), and
//! whatever the renderer itself needs, which is passed through untouched.

use http::HeaderMap;
use http::header::{HOST, USER_AGENT};

/// The incoming HTTP request as seen by the renderer.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    /// Hostname already parsed by the host framework (without port).
    pub hostname: Option<String>,
    /// Raw host value as received, possibly including a port.
    pub host: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
}

impl RequestInfo {
    /// Creates an empty request description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parsed hostname.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Sets the raw host value.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Resolves the hostname used for key namespacing.
    ///
    /// Checked in order: the parsed hostname, the raw host value, then the
    /// `Host` header. Empty values are skipped.
    pub fn resolve_hostname(&self) -> Option<&str> {
        self.hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .or_else(|| self.host.as_deref().filter(|h| !h.is_empty()))
            .or_else(|| {
                self.headers
                    .get(HOST)
                    .and_then(|value| value.to_str().ok())
                    .filter(|h| !h.is_empty())
            })
    }

    /// The `User-Agent` header value, if present and valid UTF-8.
    pub fn user_agent(&self) -> Option<&str> {
        self.headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
    }
}

/// Everything the renderer receives besides the route.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// The request being rendered.
    pub req: RequestInfo,
}

impl RenderContext {
    /// Wraps a request description.
    pub fn new(req: RequestInfo) -> Self {
        Self { req }
    }
}

impl From<RequestInfo> for RenderContext {
    fn from(req: RequestInfo) -> Self {
        Self::new(req)
    }
}
