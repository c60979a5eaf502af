// SPDX-License-Identifier: MIT
//! Point layer codec
//!
//! ```text
//! name:          u16 length + ASCII bytes
//! display name:  u16 length + UTF-8 bytes
//! count:         u32
//! positions:     count x (x: f32, y: f32, z: f32)
//! ```

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::byte_io::ByteReader;
use crate::error::{MapFileError, Result};

/// Layer name reserved for player spawn points
pub const MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS: &str = "PlayerSpawnPoints";

/// Encoded size of one position record
pub const POSITION_RECORD_SIZE: usize = 12;

/// A point in map space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MapPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }

    fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.put_f32(self.x);
        buffer.put_f32(self.y);
        buffer.put_f32(self.z);
    }
}

impl From<(f32, f32, f32)> for MapPosition {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

/// A named layer of map positions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPositions {
    name: String,
    display_name: String,
    positions: Vec<MapPosition>,
}

impl MapPositions {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            positions: Vec::new(),
        }
    }

    pub fn with_positions(
        name: impl Into<String>,
        display_name: impl Into<String>,
        positions: Vec<MapPosition>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            positions,
        }
    }

    /// Layer holding the player spawn points
    pub fn player_spawns(display_name: impl Into<String>) -> Self {
        Self::new(MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS, display_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub fn positions(&self) -> &[MapPosition] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_player_spawns(&self) -> bool {
        self.name == MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS
    }

    pub fn add_position(&mut self, position: MapPosition) {
        self.positions.push(position);
    }

    pub fn extend_positions(&mut self, positions: impl IntoIterator<Item = MapPosition>) {
        self.positions.extend(positions);
    }

    pub fn remove_position(&mut self, index: usize) -> Option<MapPosition> {
        (index < self.positions.len()).then(|| self.positions.remove(index))
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn into_positions(self) -> Vec<MapPosition> {
        self.positions
    }

    /// Decode a layer payload; the whole slice must be consumed
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);

        let name = reader.read_prefixed_bytes()?;
        if !name.is_ascii() {
            return Err(MapFileError::malformed("layer name is not ASCII"));
        }
        let name = std::str::from_utf8(name)
            .map_err(|e| MapFileError::malformed(format!("layer name is not UTF-8: {}", e)))?
            .to_string();

        let display_name = std::str::from_utf8(reader.read_prefixed_bytes()?)
            .map_err(|e| {
                MapFileError::malformed(format!("layer display name is not UTF-8: {}", e))
            })?
            .to_string();

        let count = reader.read_u32()? as usize;
        let expected = count.checked_mul(POSITION_RECORD_SIZE);
        if expected != Some(reader.remaining()) {
            return Err(MapFileError::malformed(format!(
                "layer '{}' declares {} positions but carries {} bytes of records",
                name,
                count,
                reader.remaining()
            )));
        }

        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(MapPosition::read_from(&mut reader)?);
        }

        Ok(Self {
            name,
            display_name,
            positions,
        })
    }

    /// Encode the layer; output is deterministic for a given state
    pub fn encode(&self) -> Result<Vec<u8>> {
        if !self.name.is_ascii() {
            return Err(MapFileError::invalid(format!(
                "layer name '{}' is not ASCII",
                self.name
            )));
        }
        let name_len = prefix_len(&self.name, "layer name")?;
        let display_len = prefix_len(&self.display_name, "layer display name")?;
        let count = u32::try_from(self.positions.len()).map_err(|_| {
            MapFileError::invalid(format!(
                "layer '{}' holds too many positions: {}",
                self.name,
                self.positions.len()
            ))
        })?;

        let mut buffer = Vec::with_capacity(self.encoded_len());
        buffer.put_u16(name_len);
        buffer.extend_from_slice(self.name.as_bytes());
        buffer.put_u16(display_len);
        buffer.extend_from_slice(self.display_name.as_bytes());
        buffer.put_u32(count);
        for position in &self.positions {
            position.write_to(&mut buffer);
        }

        debug_assert_eq!(buffer.len(), self.encoded_len());
        Ok(buffer)
    }

    /// Size of [`encode`](Self::encode) output
    pub fn encoded_len(&self) -> usize {
        2 + self.name.len() + 2 + self.display_name.len() + 4
            + self.positions.len() * POSITION_RECORD_SIZE
    }
}

fn prefix_len(value: &str, what: &str) -> Result<u16> {
    u16::try_from(value.len()).map_err(|_| {
        MapFileError::invalid(format!(
            "{} of {} bytes exceeds the maximum of {}",
            what,
            value.len(),
            u16::MAX
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_layer() -> MapPositions {
        MapPositions::with_positions(
            MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS,
            "Player Spawns",
            vec![
                MapPosition::new(100.0, 0.0, 200.0),
                MapPosition::new(150.5, 2.5, 175.25),
            ],
        )
    }

    #[test]
    fn test_encode_layout() {
        let layer = MapPositions::with_positions("ab", "C", vec![MapPosition::new(1.0, 0.0, -2.0)]);
        let bytes = layer.encode().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x00, 0x02, b'a', b'b', // name
                0x00, 0x01, b'C', // display name
                0x00, 0x00, 0x00, 0x01, // count
                0x3F, 0x80, 0x00, 0x00, // 1.0
                0x00, 0x00, 0x00, 0x00, // 0.0
                0xC0, 0x00, 0x00, 0x00, // -2.0
            ]
        );
        assert_eq!(bytes.len(), layer.encoded_len());
    }

    #[test]
    fn test_decode_preserves_order_and_duplicates() {
        let mut layer = spawn_layer();
        layer.add_position(MapPosition::new(100.0, 0.0, 200.0));

        let decoded = MapPositions::decode(&layer.encode().unwrap()).unwrap();
        assert_eq!(decoded, layer);
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.positions()[0], decoded.positions()[2]);
        assert!(decoded.is_player_spawns());
    }

    #[test]
    fn test_empty_layer() {
        let layer = MapPositions::new("Loot", "");
        let bytes = layer.encode().unwrap();
        assert_eq!(bytes.len(), 2 + 4 + 2 + 4);

        let decoded = MapPositions::decode(&bytes).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.name(), "Loot");
        assert_eq!(decoded.display_name(), "");
        assert!(!decoded.is_player_spawns());
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = spawn_layer().encode().unwrap();
        for cut in [0, 1, 5, bytes.len() - 1] {
            let err = MapPositions::decode(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, MapFileError::MalformedInput(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn test_decode_count_mismatch() {
        let mut bytes = spawn_layer().encode().unwrap();
        bytes.extend_from_slice(&[0u8; 4]);
        assert!(MapPositions::decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_rejects_non_ascii_name() {
        let bytes = vec![0x00, 0x01, 0xC3, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let err = MapPositions::decode(&bytes).unwrap_err();
        assert!(matches!(err, MapFileError::MalformedInput(_)));
    }

    #[test]
    fn test_display_name_may_be_unicode() {
        let layer = MapPositions::new("Heli", "Hubschrauber Absturz ü");
        let decoded = MapPositions::decode(&layer.encode().unwrap()).unwrap();
        assert_eq!(decoded.display_name(), "Hubschrauber Absturz ü");
    }

    #[test]
    fn test_encode_rejects_non_ascii_name() {
        let layer = MapPositions::new("Spawnpunkte ü", "x");
        let err = layer.encode().unwrap_err();
        assert!(matches!(err, MapFileError::InvalidArgument(_)));
    }

    #[test]
    fn test_remove_position() {
        let mut layer = spawn_layer();
        assert_eq!(
            layer.remove_position(0),
            Some(MapPosition::new(100.0, 0.0, 200.0))
        );
        assert_eq!(layer.remove_position(5), None);
        assert_eq!(layer.len(), 1);
        layer.clear();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_serde_json_shape() {
        let layer = MapPositions::with_positions("Loot", "Loot", vec![(1.0, 2.0, 3.0).into()]);
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["display_name"], "Loot");
        assert_eq!(json["positions"][0]["z"], 3.0);
    }
}
