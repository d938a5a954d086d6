//! 47-tile blob variant tables

use crate::bitmask::{optimize_bitmask, Neighborhood};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Number of distinct optimized bitmasks, and so tiles in one blob set
pub const BLOB_TILE_COUNT: u32 = 47;

fn blob_masks() -> &'static [u8] {
    static MASKS: OnceLock<Vec<u8>> = OnceLock::new();
    MASKS.get_or_init(|| {
        let mut masks: Vec<u8> = (0..=u8::MAX).map(optimize_bitmask).collect();
        masks.sort_unstable();
        masks.dedup();
        masks
    })
}

/// Position of a bitmask within the blob set (0..47).
///
/// Masks are ordered by their optimized value, so the isolated tile is 0 and
/// the fully surrounded tile is 46.
pub fn blob_index(bitmask: u8) -> u32 {
    let mask = optimize_bitmask(bitmask);
    blob_masks()
        .binary_search(&mask)
        .map(|index| index as u32)
        .unwrap_or(0)
}

/// Maps neighborhoods onto tileset indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTable {
    /// Tileset index of the first tile in the blob set
    pub first_tile: u32,
    /// First tile of the secondary set used by shallow tiles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shallow_first_tile: Option<u32>,
}

impl Default for VariantTable {
    fn default() -> Self {
        Self::blob(0)
    }
}

impl VariantTable {
    /// A single blob set starting at `first_tile`
    pub fn blob(first_tile: u32) -> Self {
        Self {
            first_tile,
            shallow_first_tile: None,
        }
    }

    /// A blob set followed directly by its shallow counterpart
    pub fn with_shallow_variations(first_tile: u32) -> Self {
        Self {
            first_tile,
            shallow_first_tile: Some(first_tile + BLOB_TILE_COUNT),
        }
    }

    /// Tileset index for a neighborhood
    pub fn variant(&self, neighborhood: &Neighborhood) -> u32 {
        let offset = blob_index(neighborhood.bitmask);
        match (neighborhood.shallow, self.shallow_first_tile) {
            (true, Some(shallow_first)) => shallow_first + offset,
            _ => self.first_tile + offset,
        }
    }
}
