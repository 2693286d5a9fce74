//! Detached execution of cache writes and version bookkeeping.
//!
//! Storing a freshly rendered page and recording the running version are
//! both done off the request path: the caller gets its page back while the
//! write is still in flight. [`OffloadManager`] runs these tasks on Tokio
//! and keeps track of them so that tests and shutdown code can wait for
//! them to settle.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use rendercache::offload::{OffloadConfig, OffloadManager, TimeoutPolicy};
//!
//! let manager = OffloadManager::new(
//!     OffloadConfig::builder()
//!         .timeout_policy(TimeoutPolicy::Warn(Duration::from_millis(250)))
//!         .build(),
//! );
//!
//! manager.spawn("version_write", async { /* ... */ });
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
