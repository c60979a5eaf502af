// SPDX-License-Identifier: MIT
//! In-memory map file document
//!
//! Holds the ordered object list that defines serialization order and
//! implements merge-on-add for point layers. Loading lives in
//! [`reader`](crate::reader), saving in [`writer`](crate::writer).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::MapFileConfig;
use crate::error::{MapFileError, Result};
use crate::format::MapFileHeader;
use crate::image::MapImage;
use crate::object::MapObject;
use crate::positions::{MapPositions, MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS};

/// A map annotation document bound (optionally) to a file on disk
#[derive(Debug, Clone, Default)]
pub struct MapFile {
    path: Option<PathBuf>,
    content: Vec<MapObject>,
    /// Header of the last file read or written
    pub(crate) header: Option<MapFileHeader>,
    pub(crate) fully_read_content: bool,
    config: MapFileConfig,
}

impl MapFile {
    /// Create an empty document bound to `path`; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(path, MapFileConfig::default())
    }

    pub fn with_config(path: impl Into<PathBuf>, config: MapFileConfig) -> Self {
        Self {
            path: Some(path.into()),
            config,
            ..Self::default()
        }
    }

    /// Create an empty document with no backing file
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub(crate) fn bound_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| MapFileError::invalid("map file has no bound path"))
    }

    pub fn config(&self) -> &MapFileConfig {
        &self.config
    }

    /// Header of the last file read or written, if any
    pub fn header(&self) -> Option<&MapFileHeader> {
        self.header.as_ref()
    }

    /// Version that the next save will write
    pub fn version(&self) -> u8 {
        self.header
            .as_ref()
            .map(MapFileHeader::version)
            .unwrap_or(self.config.default_version)
    }

    /// Whether reads of this document have decoded every supported object type
    pub fn has_fully_read_content(&self) -> bool {
        self.fully_read_content
    }

    pub fn content(&self) -> &[MapObject] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Add an object, merging point layers that share a display name
    ///
    /// A layer whose display name matches an existing layer has its
    /// positions appended to that layer and is then dropped. Anything else
    /// is appended to the end of the document.
    pub fn add_object(&mut self, object: impl Into<MapObject>) {
        match object.into() {
            MapObject::Points(incoming) => {
                if let Some(existing) = self.positions_by_display_name_mut(incoming.display_name())
                {
                    debug!(
                        display_name = existing.display_name(),
                        added = incoming.len(),
                        "Merging positions into existing layer"
                    );
                    existing.extend_positions(incoming.into_positions());
                } else {
                    self.content.push(MapObject::Points(incoming));
                }
            }
            other => self.content.push(other),
        }
    }

    pub fn add_objects<I>(&mut self, objects: I)
    where
        I: IntoIterator,
        I::Item: Into<MapObject>,
    {
        for object in objects {
            self.add_object(object);
        }
    }

    /// Remove the first object equal to `object`
    pub fn remove_object(&mut self, object: &MapObject) -> Option<MapObject> {
        let index = self.content.iter().position(|o| o == object)?;
        Some(self.content.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<MapObject> {
        (index < self.content.len()).then(|| self.content.remove(index))
    }

    /// Remove every point layer, returning them in document order
    pub fn remove_all_positions(&mut self) -> Vec<MapPositions> {
        let snapshot = std::mem::take(&mut self.content);
        let mut removed = Vec::new();
        for object in snapshot {
            match object {
                MapObject::Points(positions) => removed.push(positions),
                other => self.content.push(other),
            }
        }
        removed
    }

    /// Remove every image, returning them in document order
    pub fn remove_all_images(&mut self) -> Vec<MapImage> {
        let snapshot = std::mem::take(&mut self.content);
        let mut removed = Vec::new();
        for object in snapshot {
            match object {
                MapObject::Image(image) => removed.push(image),
                other => self.content.push(other),
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    fn positions_iter(&self) -> impl Iterator<Item = &MapPositions> {
        self.content.iter().filter_map(MapObject::as_positions)
    }

    fn positions_iter_mut(&mut self) -> impl Iterator<Item = &mut MapPositions> {
        self.content.iter_mut().filter_map(MapObject::as_positions_mut)
    }

    /// All point layers in document order
    pub fn all_positions(&self) -> Vec<&MapPositions> {
        self.positions_iter().collect()
    }

    /// All images in document order
    pub fn all_images(&self) -> Vec<&MapImage> {
        self.content.iter().filter_map(MapObject::as_image).collect()
    }

    /// The player spawn layer, if present
    pub fn player_spawns(&self) -> Option<&MapPositions> {
        self.positions_by_name(MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS)
    }

    pub fn player_spawns_mut(&mut self) -> Option<&mut MapPositions> {
        self.positions_by_name_mut(MAP_POSITIONS_NAME_PLAYER_SPAWNPOINTS)
    }

    /// Every layer other than the player spawn layer
    pub fn all_event_spawns(&self) -> Vec<&MapPositions> {
        self.positions_iter()
            .filter(|p| !p.is_player_spawns())
            .collect()
    }

    pub fn positions_by_name(&self, name: &str) -> Option<&MapPositions> {
        self.positions_iter().find(|p| p.name() == name)
    }

    pub fn positions_by_name_mut(&mut self, name: &str) -> Option<&mut MapPositions> {
        self.positions_iter_mut().find(|p| p.name() == name)
    }

    pub fn positions_by_display_name(&self, display_name: &str) -> Option<&MapPositions> {
        self.positions_iter().find(|p| p.display_name() == display_name)
    }

    pub fn positions_by_display_name_mut(
        &mut self,
        display_name: &str,
    ) -> Option<&mut MapPositions> {
        self.positions_iter_mut()
            .find(|p| p.display_name() == display_name)
    }
}
