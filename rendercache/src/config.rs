//! Cache configuration.
//!
//! Configuration is read once at setup. It can be deserialized from YAML
//! (see [`Config::from_yaml`]) or assembled with [`Config::builder`].
//!
//! ```yaml
//! version: "1.4.2"
//! cache:
//!   use_host_prefix: true
//!   pages:
//!     - /blog
//!     - pattern: "^/products/\\d+$"
//!   store:
//!     type: Memory
//!     max_entries: 1000
//!     ttl: 10m
//! ```
//!
//! A missing `cache` section or an empty `pages` list disables caching.
//! Whether caching runs at all is further gated by `is_dev`, which falls
//! back to the runtime mode (see [`RuntimeMode`]).

use std::env;
use std::fmt;

use rendercache_core::{PageFilter, PageMatcher};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::store::StoreConfig;

/// Environment variable consulted for the runtime mode.
pub const RUNTIME_MODE_ENV: &str = "APP_ENV";

/// Application build identifier, as a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppVersion {
    /// Textual version such as `"1.4.2"`.
    Text(String),
    /// Integer build number.
    Integer(i64),
    /// Floating point version such as `2.1`.
    Float(f64),
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppVersion::Text(text) => f.write_str(text),
            AppVersion::Integer(number) => write!(f, "{number}"),
            AppVersion::Float(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for AppVersion {
    fn from(value: &str) -> Self {
        AppVersion::Text(value.to_owned())
    }
}

impl From<String> for AppVersion {
    fn from(value: String) -> Self {
        AppVersion::Text(value)
    }
}

impl From<i64> for AppVersion {
    fn from(value: i64) -> Self {
        AppVersion::Integer(value)
    }
}

impl AppVersion {
    /// The version as a string, or `None` when it is empty.
    pub fn normalized(&self) -> Option<SmolStr> {
        let text = SmolStr::from(self.to_string());
        (!text.is_empty()).then_some(text)
    }
}

/// Page matcher as written in configuration.
///
/// A plain string is a literal prefix; `{ pattern: ... }` is a regular
/// expression searched anywhere in the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatcherConfig {
    /// Literal route prefix.
    Prefix(String),
    /// Regular expression.
    Pattern {
        /// Pattern source.
        pattern: String,
    },
}

impl MatcherConfig {
    /// Compiles the matcher.
    pub fn compile(&self) -> Result<PageMatcher, ConfigError> {
        match self {
            MatcherConfig::Prefix(prefix) => Ok(PageMatcher::prefix(prefix.as_str())),
            MatcherConfig::Pattern { pattern } => {
                PageMatcher::pattern(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            }
        }
    }
}

/// The `cache` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Routes eligible for caching. Empty disables the cache.
    #[serde(default)]
    pub pages: Vec<MatcherConfig>,
    /// Application version, used when no top-level version is set.
    #[serde(default)]
    pub version: Option<AppVersion>,
    /// Namespace keys by hostname and bot classification.
    #[serde(default, alias = "useHostPrefix")]
    pub use_host_prefix: bool,
    /// Explicit activation switch. Falls back to the runtime mode.
    #[serde(default, alias = "isDev")]
    pub is_dev: Option<bool>,
    /// Store selection.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application version. Takes precedence over `cache.version`.
    #[serde(default)]
    pub version: Option<AppVersion>,
    /// Cache section; absent means caching is off.
    #[serde(default)]
    pub cache: Option<CacheSettings>,
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Starts a programmatic configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The effective application version.
    ///
    /// The top-level version wins when set and non-empty; otherwise the
    /// cache section's version is used.
    pub fn effective_version(&self) -> Option<SmolStr> {
        self.version
            .as_ref()
            .and_then(AppVersion::normalized)
            .or_else(|| {
                self.cache
                    .as_ref()
                    .and_then(|cache| cache.version.as_ref())
                    .and_then(AppVersion::normalized)
            })
    }

    /// Resolves the settings the cache runs with.
    ///
    /// Returns `Ok(None)` when caching is off: no `cache` section, no pages,
    /// or an activation switch that resolves to `false`.
    pub fn activate(&self, mode: RuntimeMode) -> Result<Option<ActiveSettings>, ConfigError> {
        let Some(cache) = self.cache.as_ref() else {
            return Ok(None);
        };
        if cache.pages.is_empty() {
            return Ok(None);
        }
        if !cache.is_dev.unwrap_or(mode.is_production()) {
            return Ok(None);
        }

        let filter = cache
            .pages
            .iter()
            .map(MatcherConfig::compile)
            .collect::<Result<PageFilter, _>>()?;

        Ok(Some(ActiveSettings {
            filter,
            version: self.effective_version(),
            use_host_prefix: cache.use_host_prefix,
            store: cache.store.clone(),
        }))
    }
}

/// Settings of an active cache, with matchers compiled.
#[derive(Debug, Clone)]
pub struct ActiveSettings {
    /// Cache-friendliness filter.
    pub filter: PageFilter,
    /// Effective application version.
    pub version: Option<SmolStr>,
    /// Whether keys are namespaced by host and bot classification.
    pub use_host_prefix: bool,
    /// Store selection.
    pub store: StoreConfig,
}

/// Whether the process runs in production mode.
///
/// Only consulted when `cache.is_dev` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// `APP_ENV=production`.
    Production,
    /// Anything else.
    #[default]
    Development,
}

impl RuntimeMode {
    /// Reads the mode from `APP_ENV`.
    pub fn from_env() -> Self {
        match env::var(RUNTIME_MODE_ENV) {
            Ok(value) if value == "production" => RuntimeMode::Production,
            _ => RuntimeMode::Development,
        }
    }

    /// True in production mode.
    pub fn is_production(self) -> bool {
        matches!(self, RuntimeMode::Production)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    version: Option<AppVersion>,
    cache: CacheSettings,
}

impl ConfigBuilder {
    /// Sets the top-level application version.
    pub fn version(mut self, version: impl Into<AppVersion>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Adds a literal prefix matcher.
    pub fn page(mut self, prefix: impl Into<String>) -> Self {
        self.cache.pages.push(MatcherConfig::Prefix(prefix.into()));
        self
    }

    /// Adds a pattern matcher.
    pub fn page_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.cache.pages.push(MatcherConfig::Pattern {
            pattern: pattern.into(),
        });
        self
    }

    /// Namespaces keys by host and bot classification.
    pub fn use_host_prefix(mut self, enabled: bool) -> Self {
        self.cache.use_host_prefix = enabled;
        self
    }

    /// Forces the activation switch.
    pub fn is_dev(mut self, enabled: bool) -> Self {
        self.cache.is_dev = Some(enabled);
        self
    }

    /// Selects the store.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.cache.store = store;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Config {
        Config {
            version: self.version,
            cache: Some(self.cache),
        }
    }
}
