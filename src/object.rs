// SPDX-License-Identifier: MIT
//! Objects stored in a map file

use serde::{Deserialize, Serialize};

use crate::error::{MapFileError, Result};
use crate::format::{MapObjectHeader, MapObjectType};
use crate::image::MapImage;
use crate::positions::MapPositions;

/// A single payload of the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum MapObject {
    Image(MapImage),
    Points(MapPositions),
}

impl MapObject {
    pub fn object_type(&self) -> MapObjectType {
        match self {
            MapObject::Image(_) => MapObjectType::MapImage,
            MapObject::Points(_) => MapObjectType::MapPoints,
        }
    }

    /// Encode the payload bytes for this object
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            MapObject::Image(image) => Ok(image.to_bytes()),
            MapObject::Points(positions) => positions.encode(),
        }
    }

    /// Decode a payload of the given type; `None` for unknown types
    pub fn decode(object_type: MapObjectType, bytes: &[u8]) -> Result<Option<Self>> {
        match object_type {
            MapObjectType::MapImage => Ok(Some(MapObject::Image(MapImage::from_bytes(bytes)))),
            MapObjectType::MapPoints => Ok(Some(MapObject::Points(MapPositions::decode(bytes)?))),
            MapObjectType::Unknown(_) => Ok(None),
        }
    }

    /// Encode the payload together with its index entry
    pub(crate) fn to_entry(&self) -> Result<(MapObjectHeader, Vec<u8>)> {
        let payload = self.to_bytes()?;
        let size = u32::try_from(payload.len()).map_err(|_| {
            MapFileError::invalid(format!(
                "{} payload of {} bytes exceeds the maximum of {}",
                self.object_type().name(),
                payload.len(),
                u32::MAX
            ))
        })?;
        Ok((MapObjectHeader::new(size, self.object_type()), payload))
    }

    pub fn as_positions(&self) -> Option<&MapPositions> {
        match self {
            MapObject::Points(positions) => Some(positions),
            MapObject::Image(_) => None,
        }
    }

    pub fn as_positions_mut(&mut self) -> Option<&mut MapPositions> {
        match self {
            MapObject::Points(positions) => Some(positions),
            MapObject::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&MapImage> {
        match self {
            MapObject::Image(image) => Some(image),
            MapObject::Points(_) => None,
        }
    }
}

impl From<MapImage> for MapObject {
    fn from(image: MapImage) -> Self {
        MapObject::Image(image)
    }
}

impl From<MapPositions> for MapObject {
    fn from(positions: MapPositions) -> Self {
        MapObject::Points(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::MapPosition;

    #[test]
    fn test_object_type() {
        let image: MapObject = MapImage::from_bytes(vec![1]).into();
        let points: MapObject = MapPositions::new("a", "A").into();
        assert_eq!(image.object_type(), MapObjectType::MapImage);
        assert_eq!(points.object_type(), MapObjectType::MapPoints);
        assert!(image.as_image().is_some());
        assert!(image.as_positions().is_none());
        assert!(points.as_positions().is_some());
    }

    #[test]
    fn test_decode_dispatch() {
        let layer = MapPositions::with_positions("a", "A", vec![MapPosition::new(1.0, 2.0, 3.0)]);
        let bytes = layer.encode().unwrap();

        let decoded = MapObject::decode(MapObjectType::MapPoints, &bytes).unwrap();
        assert_eq!(decoded, Some(MapObject::Points(layer)));

        let decoded = MapObject::decode(MapObjectType::MapImage, &bytes).unwrap();
        assert_eq!(decoded.unwrap().to_bytes().unwrap(), bytes);

        assert_eq!(MapObject::decode(MapObjectType::Unknown(7), &bytes).unwrap(), None);
    }

    #[test]
    fn test_to_entry_sizes_payload() {
        let object: MapObject = MapImage::from_bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]).into();
        let (header, payload) = object.to_entry().unwrap();
        assert_eq!(header.content_size, 4);
        assert_eq!(header.object_type, MapObjectType::MapImage);
        assert_eq!(header.content_start_index, None);
        assert_eq!(payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
