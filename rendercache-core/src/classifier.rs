//! User-agent classification.
//!
//! Detecting crawlers is left to the host application. The cache only needs
//! a yes/no answer to keep bot and browser renders under separate keys.

/// Classifies a request's `User-Agent` as a bot or not.
pub trait UserAgentClassifier: Send + Sync {
    /// Returns `true` when the user agent belongs to a bot.
    ///
    /// `None` means the request carried no usable `User-Agent` header.
    fn is_bot(&self, user_agent: Option<&str>) -> bool;
}

impl<F> UserAgentClassifier for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn is_bot(&self, user_agent: Option<&str>) -> bool {
        self(user_agent)
    }
}

/// Classifier that never reports a bot.
///
/// Used when the host does not supply a classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBots;

impl UserAgentClassifier for NoBots {
    fn is_bot(&self, _user_agent: Option<&str>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_classifier() {
        let classifier = |ua: Option<&str>| ua.is_some_and(|ua| ua.contains("bot"));
        assert!(classifier.is_bot(Some("Googlebot/2.1")));
        assert!(!classifier.is_bot(Some("Mozilla/5.0")));
        assert!(!classifier.is_bot(None));
    }

    #[test]
    fn test_no_bots() {
        assert!(!NoBots.is_bot(Some("Googlebot/2.1")));
    }
}
