//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur during store interactions
/// into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// Wraps any error as an internal backend error.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BackendError::InternalError(Box::new(error))
    }
}
