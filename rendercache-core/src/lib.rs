#![warn(missing_docs)]
//! # rendercache-core
//!
//! Core traits and types for the rendercache page response cache.
//!
//! This crate holds the pieces every other rendercache crate agrees on:
//!
//! - **Render** pages through an opaque engine ([`Renderer`], [`RenderResult`])
//! - **Describe** the incoming request ([`RenderContext`], [`RequestInfo`])
//! - **Name** cached entries ([`CacheKey`])
//! - **Decide** which routes are cached at all ([`PageMatcher`], [`PageFilter`])
//! - **Classify** crawlers for key namespacing ([`UserAgentClassifier`])
//! - **Detach** background work from the request path ([`Offload`])
//!
//! Nothing here talks to a store; see `rendercache-backend` for that.

pub mod classifier;
pub mod context;
pub mod key;
pub mod label;
pub mod matcher;
pub mod offload;
pub mod render;
pub mod request;

pub use classifier::{NoBots, UserAgentClassifier};
pub use context::CacheStatus;
pub use key::CacheKey;
pub use label::BackendLabel;
pub use matcher::{PageFilter, PageMatcher};
pub use offload::Offload;
pub use render::{RenderResult, Renderer};
pub use request::{RenderContext, RequestInfo};
#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
