//! delver_map_editor - level editing engine for delver levels
//!
//! This crate provides the document model behind the level editor:
//! - `MixedMap` - a tile sub-map and a world-object sub-map kept at one grid size
//! - `TilemapEditor` - user-facing tile placement with dynamic expand/collapse
//! - Edge locking at the maximum grid size
//! - `Level` - named, hashable, saveable document owning one `MixedMap`
//! - Canvas objects (tile brushes, entities, variation groups)
//! - Tagged JSON persistence through a process-wide deserializer registry
//!
//! # Usage
//!
//! ```rust,no_run
//! use delver_map_editor::{EditorConfig, Edge, LevelFactory};
//!
//! let config = EditorConfig::default();
//! let factory = LevelFactory::new(&config);
//! let mut level = factory.create_level()?;
//!
//! level.map_mut().expand_towards(Edge::Right, 2);
//! level.save(&config)?;
//! # Ok::<(), delver_map_editor::EditorError>(())
//! ```

mod canvas_objects;
mod config;
mod error;
pub mod grid_map;
mod layers;
mod level;
mod level_factory;
mod level_loader;
mod paths;
pub mod serialization;
mod world_object;

pub use canvas_objects::{CanvasObject, CanvasObjectsFactory, CanvasObjectsManager, PlacementAction};
pub use config::{EditorConfig, TilemapKind, DELVER, ESSENTIALS_LAYER, GOAL};
pub use error::{EditorError, EditorResult};
pub use grid_map::{
    EditorTilemap, LayerRef, MixedMap, RemovedOccupant, TilemapEditor, WorldObjectsMap,
};
pub use layers::{EditorTilemapLayer, LayerDisplay, WorldObjectsLayer};
pub use level::{Level, DEFAULT_LEVEL_NAME, LEVEL_FILE_NAME};
pub use level_factory::LevelFactory;
pub use level_loader::LevelLoader;
pub use paths::AssetPaths;
pub use serialization::{
    initialize_level_deserializers, level_registry, LevelElement, LevelLayer, LevelMap,
    LevelRegistry, LoadContext,
};
pub use world_object::WorldObjectRepresentation;

// Re-export the grid primitives editor callers need
pub use delver_map_autotile;
pub use delver_map_core;
pub use delver_map_core::{Direction, Edge, GridSize, Position};
