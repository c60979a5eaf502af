// SPDX-License-Identifier: MIT
//! Error type shared by every codec and the document driver

use thiserror::Error;

/// Errors that can occur while reading, writing or editing a map file
#[derive(Debug, Error)]
pub enum MapFileError {
    /// Truncated data, size/count mismatch, bad magic or offset overflow
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unsupported map file version: {0}")]
    UnsupportedVersion(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation cannot be performed with the given arguments or state
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MapFileError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MapFileError>;
