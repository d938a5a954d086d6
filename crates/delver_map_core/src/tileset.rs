//! Tileset image references

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The image a tile layer draws its variants from.
///
/// Image decoding belongs to the renderer; the editor core only needs a
/// stable identity so layers loaded from one file can share a tileset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    /// Absolute path to the image file on this machine
    pub path: PathBuf,
}

impl Tileset {
    /// Create a tileset named after the image's file stem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
