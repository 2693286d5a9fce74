// #![warn(missing_docs)]
//! Traits and structs for rendercache store interaction.
//!
//! If you want to plug your own key-value store in, you are in the right place:
//! implement [`Backend`] and every typed operation in [`CacheBackend`] comes
//! for free.
mod backend;
pub mod composition;
mod error;
pub mod format;

pub use backend::{Backend, BackendResult, CacheBackend, Ttl};
pub use composition::MultiBackend;
pub use error::BackendError;
pub use format::{Format, FormatError, FormatExt, JsonFormat};
pub use rendercache_core::{BackendLabel, CacheKey, Raw};
