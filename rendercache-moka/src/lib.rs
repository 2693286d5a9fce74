//! In-memory store for rendercache powered by [Moka](https://docs.rs/moka).
//!
//! ```
//! use std::time::Duration;
//! use rendercache_moka::MokaBackend;
//!
//! let backend = MokaBackend::builder()
//!     .max_entries(500)
//!     .default_ttl(Duration::from_secs(300))
//!     .build();
//! ```
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
