//! Neighbor bitmask calculation

/// One flag per neighbor, clockwise from north
pub mod neighbors {
    pub const N: u8 = 1 << 0;
    pub const NE: u8 = 1 << 1;
    pub const E: u8 = 1 << 2;
    pub const SE: u8 = 1 << 3;
    pub const S: u8 = 1 << 4;
    pub const SW: u8 = 1 << 5;
    pub const W: u8 = 1 << 6;
    pub const NW: u8 = 1 << 7;
}

use neighbors::*;

/// Neighbor flag and its offset from the scanned cell. `y` grows downwards.
const OFFSETS: [(u8, i32, i32); 8] = [
    (N, 0, -1),
    (NE, 1, -1),
    (E, 1, 0),
    (SE, 1, 1),
    (S, 0, 1),
    (SW, -1, 1),
    (W, -1, 0),
    (NW, -1, -1),
];

/// Each corner with the two sides it sits between
const CORNERS: [(u8, u8); 4] = [(NE, N | E), (SE, S | E), (SW, S | W), (NW, N | W)];

/// Drop corner bits whose two adjacent sides are not both set.
///
/// A corner only changes the look of a blob tile when both cardinal
/// neighbors next to it are present, so this folds the 256 raw masks down
/// to the 47 that matter.
pub fn optimize_bitmask(bitmask: u8) -> u8 {
    CORNERS.iter().fold(bitmask, |mask, &(corner, sides)| {
        if bitmask & sides == sides {
            mask
        } else {
            mask & !corner
        }
    })
}

/// The same-type surroundings of one cell, as seen by the autotiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighborhood {
    /// Optimized 8-neighbor bitmask
    pub bitmask: u8,
    /// No tile of the same type directly below: the tile shows its front face
    pub shallow: bool,
}

impl Neighborhood {
    /// Scan the eight neighbors of `(x, y)`.
    pub fn scan<F>(x: i32, y: i32, is_same_type: F) -> Self
    where
        F: Fn(i32, i32) -> bool,
    {
        let raw = OFFSETS
            .iter()
            .filter(|&&(_, dx, dy)| is_same_type(x + dx, y + dy))
            .fold(0u8, |mask, &(flag, _, _)| mask | flag);
        Self {
            bitmask: optimize_bitmask(raw),
            shallow: raw & S == 0,
        }
    }
}
