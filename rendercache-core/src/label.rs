//! Backend label type for identifying cache stores.
//!
//! `BackendLabel` is a newtype wrapper around `SmolStr` used in log fields
//! and in the hierarchical names of tiered stores.

use smol_str::SmolStr;
use std::fmt;

/// A label identifying a cache store.
///
/// # Example
/// ```
/// use rendercache_core::BackendLabel;
///
/// let label = BackendLabel::new("multi");
/// let composed = label.compose(&BackendLabel::new("moka"));
/// assert_eq!(composed.as_str(), "multi.moka");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackendLabel(SmolStr);

impl BackendLabel {
    /// Creates a new backend label.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a backend label from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Composes two labels with a dot separator: "self.other".
    #[inline]
    pub fn compose(&self, other: &BackendLabel) -> Self {
        Self(SmolStr::from(format!("{}.{}", self.0, other.0)))
    }
}

impl fmt::Display for BackendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for BackendLabel {
    fn from(s: &'static str) -> Self {
        Self::new_static(s)
    }
}

impl From<String> for BackendLabel {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
