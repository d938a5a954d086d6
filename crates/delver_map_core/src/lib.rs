//! Core grid primitives for the delver level editor
//!
//! This crate provides the building blocks the editor's maps are made of:
//! - `Position`, `GridSize`, `Edge` - grid geometry
//! - `GridElement` - anything that occupies one cell of a layer
//! - `Tile` - an element that can autotile against its neighbors
//! - `Tileset` - the image a tile layer draws from
//! - `GridLayer` - an ordered position -> element mapping with edge queries
//! - `GridMap` - a bounded, resizable stack of layers with concurrences
//! - `DeserializerRegistry` - tag -> constructor tables for tagged payloads

mod element;
mod error;
mod geometry;
mod grid_map;
mod layer;
pub mod registry;
mod tile;
mod tileset;

pub use element::GridElement;
pub use error::{GridError, PayloadKind, SerializationError};
pub use geometry::{Axis, Direction, Edge, GridBounds, GridSize, Position};
pub use grid_map::{GridMap, MapLayer};
pub use layer::GridLayer;
pub use registry::{DeserializerRegistry, CLASS_KEY};
pub use tile::Tile;
pub use tileset::Tileset;

pub use delver_map_autotile;
