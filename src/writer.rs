// SPDX-License-Identifier: MIT
//! Saving a [`MapFile`] document
//!
//! The index is rebuilt from freshly encoded payloads on every save, so
//! the written entries always match the bytes that follow them.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::byte_io::bytes_to_hex;
use crate::config::MapFileConfig;
use crate::document::MapFile;
use crate::error::{MapFileError, Result};
use crate::format::{MapFileHeader, COUNT_FIELD_SIZE, PREAMBLE_SIZE};

impl MapFile {
    /// Serialize the document: preamble, count, index table, payloads
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut headers = Vec::with_capacity(self.len());
        let mut payloads = Vec::new();
        for object in self.content() {
            let (header, payload) = object.to_entry()?;
            payloads.extend_from_slice(&payload);
            headers.push(header);
        }

        let file_header = MapFileHeader::new(self.version(), headers);
        let mut buffer = file_header.to_bytes()?;
        debug!("Head: {}", bytes_to_hex(&buffer[..PREAMBLE_SIZE]));
        debug!(
            "Header: {}",
            bytes_to_hex(&buffer[PREAMBLE_SIZE + COUNT_FIELD_SIZE..])
        );

        buffer.reserve_exact(payloads.len());
        buffer.extend_from_slice(&payloads);
        debug_assert_eq!(buffer.len() as u64, file_header.content_end());
        Ok(buffer)
    }

    /// Save to the bound path
    pub fn save(&mut self) -> Result<()> {
        let path = self.bound_path()?.to_path_buf();
        self.save_to(path)
    }

    /// Save to `path` without rebinding the document
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.config().validate()?;
        let bytes = self.to_bytes()?;
        write_file(path, &bytes, self.config())?;

        self.header = Some(MapFileHeader::parse(&bytes)?);
        info!(
            path = %path.display(),
            objects = self.len(),
            size = bytes.len(),
            "Map file saved"
        );
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8], config: &MapFileConfig) -> Result<()> {
    if !config.atomic_writes {
        return write_and_flush(path, bytes, config.durable_writes);
    }

    let temp_path = temp_path_for(path)?;
    debug!("Writing map file to temp file: {:?}", temp_path);
    let result = write_and_flush(&temp_path, bytes, config.durable_writes)
        .and_then(|()| fs::rename(&temp_path, path).map_err(MapFileError::from));

    if let Err(e) = result {
        warn!("Failed to save map file via {:?}: {}", temp_path, e);
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp file {:?}: {}", temp_path, cleanup);
            }
        }
        return Err(e);
    }
    Ok(())
}

fn write_and_flush(path: &Path, bytes: &[u8], durable: bool) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    if durable {
        file.sync_all()?;
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        MapFileError::invalid(format!("{} does not name a file", path.display()))
    })?;
    let temp_name = format!(".{}.{}.tmp", file_name.to_string_lossy(), Uuid::new_v4());
    Ok(path.with_file_name(temp_name))
}
