// SPDX-License-Identifier: MIT
//! Map file framing: preamble, object count and object index table
//!
//! ```text
//! Preamble (12 bytes, big-endian):
//! - Magic: "MAPF" (4 bytes)
//! - Version (1 byte)
//! - Reserved: zero (3 bytes)
//! - Index table length in bytes (4 bytes)
//!
//! Object count: u16 (2 bytes)
//!
//! Index table: count x 8-byte entries
//! - Content size: u32 (4 bytes)
//! - Type tag: u8 (1 byte)
//! - Reserved: zero (3 bytes)
//!
//! Payloads: concatenated in index order
//! ```

use std::io::Read;

use bytes::BufMut;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::byte_io::{bytes_to_hex, ByteReader};
use crate::error::{MapFileError, Result};

/// Map file magic bytes
pub const MAP_FILE_MAGIC: &[u8; 4] = b"MAPF";

/// Version written for documents that were never read from disk
pub const CURRENT_VERSION: u8 = 0;

/// Versions this codec can read and write
pub const SUPPORTED_VERSIONS: &[u8] = &[0];

/// Fixed preamble size in bytes
pub const PREAMBLE_SIZE: usize = 12;

/// Size of the object count that follows the preamble
pub const COUNT_FIELD_SIZE: usize = 2;

/// Size of one object index entry
pub const CONTENT_HEADER_SIZE: usize = 8;

/// Type tag values stored in the index table
pub mod tags {
    pub const MAP_IMAGE: u8 = 0;
    pub const MAP_POINTS: u8 = 1;
}

/// Kind of payload described by an index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapObjectType {
    MapImage,
    MapPoints,
    /// Tag written by a newer or foreign producer; skipped on read
    Unknown(u8),
}

impl MapObjectType {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            tags::MAP_IMAGE => MapObjectType::MapImage,
            tags::MAP_POINTS => MapObjectType::MapPoints,
            other => MapObjectType::Unknown(other),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            MapObjectType::MapImage => tags::MAP_IMAGE,
            MapObjectType::MapPoints => tags::MAP_POINTS,
            MapObjectType::Unknown(tag) => *tag,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapObjectType::MapImage => "MAP_IMAGE",
            MapObjectType::MapPoints => "MAP_POINTS",
            MapObjectType::Unknown(_) => "UNKNOWN",
        }
    }
}

/// One entry of the object index table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapObjectHeader {
    /// Payload length in bytes
    pub content_size: u32,

    pub object_type: MapObjectType,

    /// Absolute payload offset; only known for headers parsed from a file
    pub content_start_index: Option<u64>,
}

impl MapObjectHeader {
    /// Build an entry for writing; the start offset is implied by position
    pub fn new(content_size: u32, object_type: MapObjectType) -> Self {
        Self {
            content_size,
            object_type,
            content_start_index: None,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != CONTENT_HEADER_SIZE {
            return Err(MapFileError::malformed(format!(
                "index entry must be {} bytes, got {}",
                CONTENT_HEADER_SIZE,
                bytes.len()
            )));
        }
        let mut reader = ByteReader::new(bytes);
        let content_size = reader.read_u32()?;
        let object_type = MapObjectType::from_tag(reader.read_u8()?);
        Ok(Self::new(content_size, object_type))
    }

    pub fn to_bytes(&self) -> [u8; CONTENT_HEADER_SIZE] {
        let mut bytes = [0u8; CONTENT_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.content_size.to_be_bytes());
        bytes[4] = self.object_type.tag();
        bytes
    }

    /// Payload range `[start, end)` as file offsets
    pub fn content_range(&self) -> Option<(u64, u64)> {
        let start = self.content_start_index?;
        Some((start, start + self.content_size as u64))
    }
}

/// Decoded file header: version plus the object index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFileHeader {
    version: u8,
    headers: Vec<MapObjectHeader>,
}

impl MapFileHeader {
    pub fn new(version: u8, headers: Vec<MapObjectHeader>) -> Self {
        Self { version, headers }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn headers(&self) -> &[MapObjectHeader] {
        &self.headers
    }

    pub fn object_count(&self) -> usize {
        self.headers.len()
    }

    /// Offset of the first payload byte
    pub fn content_base(&self) -> u64 {
        content_base(self.headers.len())
    }

    /// Offset one past the last payload byte, i.e. the expected file length
    pub fn content_end(&self) -> u64 {
        self.headers
            .iter()
            .fold(self.content_base(), |acc, h| acc + h.content_size as u64)
    }

    /// Whether any entry describes an embedded image
    pub fn has_images(&self) -> bool {
        self.headers
            .iter()
            .any(|h| h.object_type == MapObjectType::MapImage)
    }

    /// Produce the fixed preamble for `version` and a serialized index table
    pub fn emit_preamble(version: u8, index_table: &[u8]) -> Result<[u8; PREAMBLE_SIZE]> {
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(MapFileError::UnsupportedVersion(version));
        }
        let index_len = u32::try_from(index_table.len()).map_err(|_| {
            MapFileError::invalid(format!(
                "index table of {} bytes does not fit the preamble",
                index_table.len()
            ))
        })?;

        let mut preamble = [0u8; PREAMBLE_SIZE];
        preamble[0..4].copy_from_slice(MAP_FILE_MAGIC);
        preamble[4] = version;
        preamble[8..12].copy_from_slice(&index_len.to_be_bytes());
        Ok(preamble)
    }

    /// Serialize preamble, count and index table
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = u16::try_from(self.headers.len()).map_err(|_| {
            MapFileError::invalid(format!(
                "{} objects exceed the maximum of {}",
                self.headers.len(),
                u16::MAX
            ))
        })?;
        let index_table = self.index_table();
        let preamble = Self::emit_preamble(self.version, &index_table)?;

        let mut buffer = Vec::with_capacity(PREAMBLE_SIZE + COUNT_FIELD_SIZE + index_table.len());
        buffer.extend_from_slice(&preamble);
        buffer.put_u16(count);
        buffer.extend_from_slice(&index_table);
        Ok(buffer)
    }

    /// Concatenated index entries in object order
    pub fn index_table(&self) -> Vec<u8> {
        let mut table = Vec::with_capacity(self.headers.len() * CONTENT_HEADER_SIZE);
        for header in &self.headers {
            table.extend_from_slice(&header.to_bytes());
        }
        table
    }

    /// Parse the header from the start of an in-memory file
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let preamble = reader.read_bytes(PREAMBLE_SIZE)?;
        let (version, index_len) = parse_preamble(preamble)?;
        let count = reader.read_u16()? as usize;
        check_index_len(count, index_len)?;
        let table = reader.read_bytes(index_len)?;
        Self::from_index_table(version, table)
    }

    /// Read exactly the preamble, count and index table from `reader`
    ///
    /// No payload byte is consumed, so this is enough to inspect an index
    /// without loading the rest of the file.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut preamble = [0u8; PREAMBLE_SIZE];
        read_exact(reader, &mut preamble, "preamble")?;
        let (version, index_len) = parse_preamble(&preamble)?;

        let mut count = [0u8; COUNT_FIELD_SIZE];
        read_exact(reader, &mut count, "object count")?;
        let count = u16::from_be_bytes(count) as usize;
        check_index_len(count, index_len)?;

        let mut table = vec![0u8; index_len];
        read_exact(reader, &mut table, "index table")?;
        Self::from_index_table(version, &table)
    }

    fn from_index_table(version: u8, table: &[u8]) -> Result<Self> {
        debug!("Index table: {}", bytes_to_hex(table));

        let count = table.len() / CONTENT_HEADER_SIZE;
        let mut offset = content_base(count);
        let mut headers = Vec::with_capacity(count);
        for entry in table.chunks_exact(CONTENT_HEADER_SIZE) {
            let mut header = MapObjectHeader::from_bytes(entry)?;
            header.content_start_index = Some(offset);
            offset = offset
                .checked_add(header.content_size as u64)
                .ok_or_else(|| MapFileError::malformed("payload offsets overflow"))?;
            headers.push(header);
        }

        debug!(version, objects = headers.len(), "Parsed map file header");
        Ok(Self { version, headers })
    }
}

/// Offset of the first payload for a file holding `count` objects
pub fn content_base(count: usize) -> u64 {
    (PREAMBLE_SIZE + COUNT_FIELD_SIZE + count * CONTENT_HEADER_SIZE) as u64
}

fn parse_preamble(preamble: &[u8]) -> Result<(u8, usize)> {
    if &preamble[0..4] != MAP_FILE_MAGIC {
        return Err(MapFileError::malformed(format!(
            "invalid magic bytes: expected {}, got {}",
            bytes_to_hex(MAP_FILE_MAGIC),
            bytes_to_hex(&preamble[0..4])
        )));
    }

    let version = preamble[4];
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(MapFileError::UnsupportedVersion(version));
    }

    let mut reader = ByteReader::new(&preamble[8..12]);
    let index_len = reader.read_u32()? as usize;
    Ok((version, index_len))
}

fn check_index_len(count: usize, index_len: usize) -> Result<()> {
    if count * CONTENT_HEADER_SIZE != index_len {
        return Err(MapFileError::malformed(format!(
            "object count {} does not match index table length {}",
            count, index_len
        )));
    }
    Ok(())
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            MapFileError::malformed(format!("unexpected end of file reading {}", what))
        }
        _ => MapFileError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> MapFileHeader {
        MapFileHeader::new(
            0,
            vec![
                MapObjectHeader::new(100, MapObjectType::MapPoints),
                MapObjectHeader::new(4, MapObjectType::MapImage),
                MapObjectHeader::new(7, MapObjectType::Unknown(42)),
            ],
        )
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(MapObjectType::from_tag(0), MapObjectType::MapImage);
        assert_eq!(MapObjectType::from_tag(1), MapObjectType::MapPoints);
        assert_eq!(MapObjectType::from_tag(9), MapObjectType::Unknown(9));
        assert_eq!(MapObjectType::Unknown(9).tag(), 9);
        assert_eq!(MapObjectType::MapPoints.name(), "MAP_POINTS");
    }

    #[test]
    fn test_object_header_layout() {
        let header = MapObjectHeader::new(0x01020304, MapObjectType::MapPoints);
        assert_eq!(header.to_bytes(), [1, 2, 3, 4, 1, 0, 0, 0]);

        let parsed = MapObjectHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(MapObjectHeader::from_bytes(&[0; 5]).is_err());
    }

    #[test]
    fn test_emit_preamble_layout() {
        let preamble = MapFileHeader::emit_preamble(0, &[0u8; 16]).unwrap();
        assert_eq!(&preamble[0..4], b"MAPF");
        assert_eq!(preamble[4], 0);
        assert_eq!(&preamble[5..8], &[0, 0, 0]);
        assert_eq!(&preamble[8..12], &[0, 0, 0, 16]);
    }

    #[test]
    fn test_emit_preamble_rejects_unknown_version() {
        let err = MapFileHeader::emit_preamble(3, &[]).unwrap_err();
        assert!(matches!(err, MapFileError::UnsupportedVersion(3)));
    }

    #[test]
    fn test_parse_computes_start_offsets() {
        let bytes = sample_header().to_bytes().unwrap();
        assert_eq!(bytes.len(), PREAMBLE_SIZE + COUNT_FIELD_SIZE + 3 * CONTENT_HEADER_SIZE);

        let parsed = MapFileHeader::parse(&bytes).unwrap();
        let base = content_base(3);
        assert_eq!(base, 38);
        let starts: Vec<_> = parsed
            .headers()
            .iter()
            .map(|h| h.content_start_index.unwrap())
            .collect();
        assert_eq!(starts, vec![base, base + 100, base + 104]);
        assert_eq!(parsed.content_end(), base + 111);
        assert_eq!(parsed.headers()[2].object_type, MapObjectType::Unknown(42));
        assert_eq!(parsed.headers()[1].content_range(), Some((base + 100, base + 104)));
    }

    #[test]
    fn test_read_from_matches_parse() {
        let mut bytes = sample_header().to_bytes().unwrap();
        // Payload bytes after the index must be left untouched
        bytes.extend_from_slice(&[0xAA; 111]);
        let mut cursor = std::io::Cursor::new(&bytes);

        let read = MapFileHeader::read_from(&mut cursor).unwrap();
        assert_eq!(read, MapFileHeader::parse(&bytes).unwrap());
        assert_eq!(cursor.position(), content_base(3));
    }

    #[test]
    fn test_parse_empty() {
        let bytes = MapFileHeader::new(0, vec![]).to_bytes().unwrap();
        assert_eq!(bytes.len(), 14);
        let parsed = MapFileHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.object_count(), 0);
        assert!(!parsed.has_images());
        assert_eq!(parsed.content_end(), 14);
    }

    #[test]
    fn test_parse_bad_magic() {
        let mut bytes = sample_header().to_bytes().unwrap();
        bytes[0] = b'X';
        let err = MapFileHeader::parse(&bytes).unwrap_err();
        assert!(matches!(err, MapFileError::MalformedInput(_)));
    }

    #[test]
    fn test_parse_unsupported_version() {
        let mut bytes = sample_header().to_bytes().unwrap();
        bytes[4] = 9;
        let err = MapFileHeader::parse(&bytes).unwrap_err();
        assert!(matches!(err, MapFileError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_parse_count_mismatch() {
        let mut bytes = sample_header().to_bytes().unwrap();
        // Claim four objects while the index holds three
        bytes[PREAMBLE_SIZE + 1] = 4;
        let err = MapFileHeader::parse(&bytes).unwrap_err();
        assert!(matches!(err, MapFileError::MalformedInput(_)));
    }

    #[test]
    fn test_parse_truncated_index() {
        let bytes = sample_header().to_bytes().unwrap();
        let err = MapFileHeader::parse(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, MapFileError::MalformedInput(_)));

        let mut cursor = std::io::Cursor::new(&bytes[..bytes.len() - 3]);
        let err = MapFileHeader::read_from(&mut cursor).unwrap_err();
        assert!(matches!(err, MapFileError::MalformedInput(_)));
    }

    #[test]
    fn test_has_images() {
        assert!(sample_header().has_images());
        let points_only = MapFileHeader::new(
            0,
            vec![MapObjectHeader::new(1, MapObjectType::MapPoints)],
        );
        assert!(!points_only.has_images());
    }
}
