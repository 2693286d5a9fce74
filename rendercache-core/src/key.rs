//! Cache key type and construction.
//!
//! A [`CacheKey`] is a logical identifier, not a filesystem path. Keys built
//! from several segments are joined with `/` after trimming surrounding
//! slashes from every segment and dropping the empty ones:
//!
//! ```
//! use rendercache_core::CacheKey;
//!
//! let key = CacheKey::from_segments(["example.com", "/a", "__", "false"]);
//! assert_eq!(key.as_str(), "example.com/a/__/false");
//!
//! let key = CacheKey::from_route("/blog/post-1");
//! assert_eq!(key.to_string(), "/blog/post-1");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] wraps a [`SmolStr`]: short keys (≤23 bytes) live inline and
//! longer ones share a reference-counted buffer, so cloning never copies
//! the key text.

use std::fmt;

use smol_str::{SmolStr, SmolStrBuilder};

/// Separator placed between key segments.
pub const SEGMENT_SEPARATOR: char = '/';

/// Well-known key holding the last application version seen by the store.
pub const VERSION_RECORD_KEY: &str = "appVersion";

/// A cache key identifying a cached entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(SmolStr);

impl CacheKey {
    /// Creates a key equal to the route string.
    pub fn from_route(route: impl Into<SmolStr>) -> Self {
        CacheKey(route.into())
    }

    /// Joins segments into a single key.
    ///
    /// Surrounding `/` characters are trimmed from each segment and empty
    /// segments are skipped, so the result is the same whether or not a
    /// route carries a leading slash.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = SmolStrBuilder::new();
        let mut first = true;
        for segment in segments {
            let trimmed = segment.as_ref().trim_matches(SEGMENT_SEPARATOR);
            if trimmed.is_empty() {
                continue;
            }
            if !first {
                builder.push(SEGMENT_SEPARATOR);
            }
            builder.push_str(trimmed);
            first = false;
        }
        CacheKey(builder.finish())
    }

    /// Key of the version record.
    pub fn version_record() -> Self {
        CacheKey(SmolStr::new_static(VERSION_RECORD_KEY))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Approximate memory footprint of the key in bytes.
    ///
    /// Used by byte-weighted stores for capacity accounting.
    pub fn memory_size(&self) -> usize {
        let heap = if self.0.is_heap_allocated() {
            self.0.len()
        } else {
            0
        };
        std::mem::size_of::<Self>() + heap
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::from_route(value)
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey::from_route(value)
    }
}
