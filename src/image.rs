// SPDX-License-Identifier: MIT
//! Embedded image codec
//!
//! The container does not interpret image payloads: bytes are stored and
//! returned verbatim, framed only by the size in their index entry.

use serde::{Deserialize, Serialize};

/// An embedded raster image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapImage {
    data: Vec<u8>,
}

impl MapImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Replace the payload with `bytes`
    pub fn load_from_bytes(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
    }

    /// Payload as written to the container
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type guessed from the payload signature, if recognized
    #[cfg(feature = "file-type-detection")]
    pub fn mime_type(&self) -> Option<&'static str> {
        infer::get(&self.data).map(|kind| kind.mime_type())
    }

    /// Whether the payload signature is a known image format
    #[cfg(feature = "file-type-detection")]
    pub fn is_image(&self) -> bool {
        infer::is_image(&self.data)
    }
}

impl From<Vec<u8>> for MapImage {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}
