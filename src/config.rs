// SPDX-License-Identifier: MIT
//! Document configuration

use crate::error::{MapFileError, Result};
use crate::format::{CURRENT_VERSION, SUPPORTED_VERSIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapFileConfig {
    /// Version written by documents that were never read from disk
    pub default_version: u8,
    /// Write to a sibling temp file and rename it over the target
    pub atomic_writes: bool,
    /// `fsync` the written file before the save returns
    pub durable_writes: bool,
}

impl MapFileConfig {
    pub fn new() -> Self {
        Self {
            default_version: CURRENT_VERSION,
            atomic_writes: true,
            durable_writes: false,
        }
    }

    pub fn with_default_version(mut self, version: u8) -> Self {
        self.default_version = version;
        self
    }

    pub fn with_atomic_writes(mut self, atomic_writes: bool) -> Self {
        self.atomic_writes = atomic_writes;
        self
    }

    pub fn with_durable_writes(mut self, durable_writes: bool) -> Self {
        self.durable_writes = durable_writes;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.default_version) {
            return Err(MapFileError::invalid(format!(
                "default version {} is not one of {:?}",
                self.default_version, SUPPORTED_VERSIONS
            )));
        }
        Ok(())
    }
}

impl Default for MapFileConfig {
    fn default() -> Self {
        Self::new()
    }
}
