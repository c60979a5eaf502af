// SPDX-License-Identifier: MIT
//! # Map Annotation Container
//!
//! Reads and writes the binary container used to store annotations over a
//! 2-D game map: named point layers (spawn points, event locations) and
//! embedded raster images.
//!
//! ## Format Overview
//!
//! A map file is a fixed preamble, an object count, an index table with one
//! fixed-width entry per object, and the object payloads concatenated in
//! index order. Payload offsets are not stored; they are recomputed from
//! the entry sizes when the index is parsed.
//!
//! ```text
//! Map File Format
//! ===============
//!
//! Preamble (12 bytes, big-endian):
//! - Magic: "MAPF" (4 bytes)
//! - Version: 0 (1 byte)
//! - Reserved (3 bytes)
//! - Index table length (4 bytes)
//!
//! Object count (u16)
//!
//! Index table (count x 8 bytes):
//! - Content size (u32)
//! - Type tag (u8): 0 = image, 1 = points
//! - Reserved (3 bytes)
//!
//! Payloads (variable size):
//! - Points: name, display name, u32 count, count x (f32, f32, f32)
//! - Image: opaque bytes
//! ```
//!
//! ## Key Features
//!
//! - **Merge-on-add**: point layers sharing a display name collapse into one
//! - **Selective reads**: decode only points, only images, or only the index
//! - **Lossless round-trip**: object order, position order and image bytes
//!   survive save/load unchanged
//! - **Tolerant reader**: unknown object types are skipped, not rejected
//!
//! ## Usage
//!
//! ```no_run
//! use map_container::{MapFile, MapImage, MapPosition, MapPositions};
//!
//! let mut map = MapFile::new("chernarus.map");
//! let mut spawns = MapPositions::player_spawns("Player Spawns");
//! spawns.add_position(MapPosition::new(100.0, 0.0, 200.0));
//! map.add_object(spawns);
//! map.add_object(MapImage::from_bytes(std::fs::read("overlay.png").unwrap()));
//! map.save().unwrap();
//!
//! let mut reloaded = MapFile::new("chernarus.map");
//! if reloaded.has_images().unwrap() {
//!     reloaded.read_images_only().unwrap();
//! }
//! ```

pub mod byte_io;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod image;
pub mod object;
pub mod positions;
pub mod reader;
pub mod writer;

// Re-export main types
pub use config::MapFileConfig;
pub use document::MapFile;
pub use error::{MapFileError, Result};
pub use format::{
    MapFileHeader, MapObjectHeader, MapObjectType, CONTENT_HEADER_SIZE, COUNT_FIELD_SIZE,
    CURRENT_VERSION, MAP_FILE_MAGIC, PREAMBLE_SIZE,
};
pub use image::MapImage;
pub use object::MapObject;
pub use positions::{MapPosition, MapPositions, MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS};
pub use reader::ReadMode;
