// SPDX-License-Identifier: MIT
//! Loading map files into a [`MapFile`] document

use std::fs::File;
use std::io::BufReader;

use tracing::{debug, info, warn};

use crate::byte_io::substring;
use crate::document::MapFile;
use crate::error::{MapFileError, Result};
use crate::format::{MapFileHeader, MapObjectType};
use crate::object::MapObject;

/// Which payload types a read decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    All,
    PositionsOnly,
    ImagesOnly,
}

impl ReadMode {
    /// Whether payloads of `object_type` are decoded in this mode
    #[inline]
    pub fn reads(&self, object_type: MapObjectType) -> bool {
        match (self, object_type) {
            (_, MapObjectType::Unknown(_)) => false,
            (ReadMode::All, _) => true,
            (ReadMode::PositionsOnly, ty) => ty == MapObjectType::MapPoints,
            (ReadMode::ImagesOnly, ty) => ty == MapObjectType::MapImage,
        }
    }
}

impl MapFile {
    /// Open `path` and read all of its content
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let mut map_file = Self::new(path);
        map_file.read_content()?;
        Ok(map_file)
    }

    /// Decode an in-memory map file into an unbound document
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut map_file = Self::unbound();
        map_file.read_from_bytes(data, ReadMode::All)?;
        Ok(map_file)
    }

    pub fn read_content(&mut self) -> Result<()> {
        self.read(ReadMode::All)
    }

    pub fn read_positions_only(&mut self) -> Result<()> {
        self.read(ReadMode::PositionsOnly)
    }

    pub fn read_images_only(&mut self) -> Result<()> {
        self.read(ReadMode::ImagesOnly)
    }

    /// Read the bound file, decoding the payload types enabled by `mode`
    ///
    /// Decoded objects are added to the document (with merge-on-add), so
    /// complementary selective reads accumulate into the full content.
    /// Only a read in [`ReadMode::All`] marks the content as fully read.
    pub fn read(&mut self, mode: ReadMode) -> Result<()> {
        let path = self.bound_path()?.to_path_buf();
        debug!(path = %path.display(), ?mode, "Reading map file");
        let data = std::fs::read(&path)?;
        self.read_from_bytes(&data, mode)?;
        info!(
            path = %path.display(),
            objects = self.len(),
            fully_read = self.fully_read_content,
            "Map file loaded"
        );
        Ok(())
    }

    /// Decode `data` as a map file and add its objects to this document
    pub fn read_from_bytes(&mut self, data: &[u8], mode: ReadMode) -> Result<()> {
        let header = MapFileHeader::parse(data)?;
        debug!("Content Headers: {}", header.object_count());

        if header.content_end() > data.len() as u64 {
            return Err(MapFileError::malformed(format!(
                "map file is {} bytes but its index needs {}",
                data.len(),
                header.content_end()
            )));
        }
        if header.content_end() < data.len() as u64 {
            warn!(
                expected = header.content_end(),
                actual = data.len(),
                "Trailing bytes after the last payload"
            );
        }

        let entries = header.headers().to_vec();
        self.header = Some(header);

        for entry in entries {
            let start = entry
                .content_start_index
                .ok_or_else(|| MapFileError::malformed("index entry without start offset"))?;
            let start = usize::try_from(start)
                .map_err(|_| MapFileError::malformed("payload offset exceeds address space"))?;
            debug!("Header: {} {}", start, entry.content_size);

            // Every entry is sliced, so truncation fails in every mode
            let payload = substring(data, start, entry.content_size as usize)?;

            if let MapObjectType::Unknown(tag) = entry.object_type {
                warn!(tag, size = entry.content_size, "Skipping object of unknown type");
                continue;
            }
            if !mode.reads(entry.object_type) {
                continue;
            }
            if let Some(object) = MapObject::decode(entry.object_type, payload)? {
                self.add_object(object);
            }
        }

        self.fully_read_content = mode == ReadMode::All;
        Ok(())
    }

    /// Read and cache only the header and object index of the bound file
    pub fn read_header(&mut self) -> Result<&MapFileHeader> {
        let path = self.bound_path()?;
        let mut reader = BufReader::new(File::open(path)?);
        let header = MapFileHeader::read_from(&mut reader)?;
        Ok(self.header.insert(header))
    }

    /// Whether the bound file holds any image, judged from its index alone
    pub fn has_images(&mut self) -> Result<bool> {
        let header = self.read_header()?;
        debug!("Content Headers: {}", header.object_count());
        Ok(header.has_images())
    }
}
