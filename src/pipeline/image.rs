//! Captured image references and loading.

use std::fmt;
use std::fs;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Opaque reference to a captured image (path or URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

/// Resolves an `ImageRef` to an uploadable JPEG payload.
pub trait ImageLoader: Send + Sync {
    fn load_jpeg(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>>;
}

/// Reads JPEG files from the local filesystem.
///
/// Accepts plain paths and `file://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load_jpeg(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        let path = image
            .as_str()
            .strip_prefix("file://")
            .unwrap_or(image.as_str());

        let bytes = fs::read(path).with_context(|| format!("cannot read {}", path))?;
        ensure!(!bytes.is_empty(), "{} is empty", path);
        ensure!(bytes.starts_with(&JPEG_SOI), "{} is not a JPEG image", path);
        Ok(bytes)
    }
}
