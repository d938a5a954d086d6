//! Neighbor-based autotile variant selection
//!
//! This crate computes which visual variant a tile should use from the tiles
//! of the same type around it:
//! - [`optimize_bitmask`] keeps only the corners that affect a blob tile
//! - [`Neighborhood`] bundles the bitmask with the "shallow" classification
//! - [`VariantTable`] maps a neighborhood onto a tileset index using the
//!   47-tile blob layout, with an optional secondary table for shallow tiles
//!
//! # Example
//!
//! ```rust
//! use delver_map_autotile::{Neighborhood, VariantTable};
//!
//! let walls = [(0, 0), (1, 0), (0, 1)];
//! let is_wall = |x: i32, y: i32| walls.contains(&(x, y));
//!
//! let neighborhood = Neighborhood::scan(0, 0, is_wall);
//! let table = VariantTable::with_shallow_variations(0);
//! let variant = table.variant(&neighborhood);
//! assert!(variant < 2 * delver_map_autotile::BLOB_TILE_COUNT);
//! ```

pub mod bitmask;
pub mod blob;

pub use bitmask::{neighbors, optimize_bitmask, Neighborhood};
pub use blob::{blob_index, VariantTable, BLOB_TILE_COUNT};
