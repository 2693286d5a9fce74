use thiserror::Error;

/// Errors raised while turning configuration into a running cache.
///
/// Missing or empty configuration is not an error: it leaves the renderer
/// untouched. These variants cover configuration that is present but wrong.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A page pattern failed to compile.
    #[error("invalid page pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A `Multi` store was configured without tiers.
    #[error("multi store requires at least one tier")]
    EmptyStoreList,

    /// Setup ran outside of a Tokio runtime, so detached tasks cannot run.
    #[error("cache setup requires a running Tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
