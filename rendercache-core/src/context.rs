//! Outcome of a single intercepted render request.

use std::fmt;

/// How a render request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// The stored entry was returned; the renderer was not called.
    Hit,
    /// Nothing usable was stored (or the lookup failed); the page was rendered.
    #[default]
    Miss,
    /// The route is not cache-friendly; the renderer was called directly.
    Bypass,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
