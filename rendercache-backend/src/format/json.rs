use bytes::Bytes;
use rendercache_core::Raw;

use super::{Format, FormatError, FormatTypeId};

/// JSON format (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn with_serializer(&self, value: &dyn erased_serde::Serialize) -> Result<Raw, FormatError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| FormatError::Serialize(Box::new(e)))
    }

    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn for<'de> FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError> {
        let mut deser = serde_json::Deserializer::from_slice(data);
        {
            let mut erased = <dyn erased_serde::Deserializer>::erase(&mut deser);
            f(&mut erased)?;
        }
        deser
            .end()
            .map_err(|e| FormatError::Deserialize(Box::new(e)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Json
    }
}
