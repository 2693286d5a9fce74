//! Value serialization formats.
//!
//! A [`Format`] turns render results into the bytes a store keeps and back.
//! It is object safe (built on `erased-serde`) so stores can hold it as
//! `&dyn Format`; the generic entry points live in [`FormatExt`].

use rendercache_core::Raw;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod json;

pub use json::JsonFormat;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Unique identifier for format types, used to compare format equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    Json,
    /// For user-defined custom formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Object-safe format trait (uses erased-serde for type erasure)
/// This trait can be used with `&dyn Format` for dynamic dispatch
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Serializes a type-erased value into bytes.
    fn with_serializer(&self, value: &dyn erased_serde::Serialize) -> Result<Raw, FormatError>;

    /// Provides access to a deserializer via a callback to avoid lifetime issues
    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn for<'de> FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError>;

    /// Clone this format into a box (for object safety)
    fn clone_box(&self) -> Box<dyn Format>;

    /// Returns a unique identifier for this format type.
    /// Used to compare format equality without knowing the concrete type.
    fn format_type_id(&self) -> FormatTypeId;
}

/// Extension trait providing generic serialize/deserialize methods
/// This is automatically implemented for all Format types
pub trait FormatExt: Format {
    fn serialize<T>(&self, value: &T) -> Result<Raw, FormatError>
    where
        T: Serialize,
    {
        self.with_serializer(value)
    }

    fn deserialize<T>(&self, data: &[u8]) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        let mut result: Option<T> = None;
        self.with_deserializer(data, &mut |deserializer| {
            let value: T = erased_serde::deserialize(deserializer)
                .map_err(|e| FormatError::Deserialize(Box::new(e)))?;
            result = Some(value);
            Ok(())
        })?;

        result.ok_or_else(|| {
            FormatError::Deserialize(Box::new(std::io::Error::other(
                "deserialization produced no result",
            )))
        })
    }
}

impl<F: Format + ?Sized> FormatExt for F {}

impl Clone for Box<dyn Format> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Page {
        html: String,
        error: Option<String>,
    }

    #[test]
    fn test_json_through_dyn_format() {
        let format: &dyn Format = &JsonFormat;
        let page = Page {
            html: "<p>hi</p>".to_owned(),
            error: None,
        };

        let raw = format.serialize(&page).unwrap();
        let back: Page = format.deserialize(&raw).unwrap();

        assert_eq!(back, page);
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result: Result<Page, _> = JsonFormat.deserialize(b"not json");
        assert!(matches!(result, Err(FormatError::Deserialize(_))));
    }

    #[test]
    fn test_boxed_format_clone_keeps_identity() {
        let boxed: Box<dyn Format> = Box::new(JsonFormat);
        assert_eq!(boxed.clone().format_type_id(), FormatTypeId::Json);
    }
}
