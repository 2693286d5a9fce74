//! Cache-friendliness filtering.
//!
//! Only routes matched by at least one [`PageMatcher`] go through the cache.
//! Everything else is rendered directly without touching the store.
//!
//! ```
//! use rendercache_core::{PageFilter, PageMatcher};
//!
//! let filter = PageFilter::new(vec![
//!     PageMatcher::prefix("/blog"),
//!     PageMatcher::pattern(r"^/products/\d+$").unwrap(),
//! ]);
//!
//! assert!(filter.is_cache_friendly("/blog/hello"));
//! assert!(filter.is_cache_friendly("/products/42"));
//! assert!(!filter.is_cache_friendly("/account"));
//! ```

use regex::Regex;
use smol_str::SmolStr;

/// A single route matcher.
#[derive(Debug, Clone)]
pub enum PageMatcher {
    /// Matches routes starting with the literal.
    Prefix(SmolStr),
    /// Matches routes the pattern finds a match in.
    Pattern(Regex),
}

impl PageMatcher {
    /// Literal prefix matcher.
    pub fn prefix(prefix: impl Into<SmolStr>) -> Self {
        PageMatcher::Prefix(prefix.into())
    }

    /// Compiles a pattern matcher.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(PageMatcher::Pattern)
    }

    /// Whether this matcher accepts the route.
    pub fn matches(&self, route: &str) -> bool {
        match self {
            PageMatcher::Prefix(prefix) => route.starts_with(prefix.as_str()),
            PageMatcher::Pattern(pattern) => pattern.is_match(route),
        }
    }
}

impl From<Regex> for PageMatcher {
    fn from(pattern: Regex) -> Self {
        PageMatcher::Pattern(pattern)
    }
}

/// Ordered list of matchers deciding which routes are cached.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    matchers: Vec<PageMatcher>,
}

impl PageFilter {
    /// Creates a filter from matchers.
    pub fn new(matchers: Vec<PageMatcher>) -> Self {
        Self { matchers }
    }

    /// True when any matcher accepts the route.
    ///
    /// Stops at the first match; matcher order only affects speed.
    pub fn is_cache_friendly(&self, route: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(route))
    }

    /// True when there are no matchers, which disables caching entirely.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Number of matchers.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// The configured matchers in evaluation order.
    pub fn matchers(&self) -> &[PageMatcher] {
        &self.matchers
    }
}

impl FromIterator<PageMatcher> for PageFilter {
    fn from_iter<T: IntoIterator<Item = PageMatcher>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
