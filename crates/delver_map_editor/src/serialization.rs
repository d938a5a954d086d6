//! Level-specific tagged payloads and the process-wide deserializer registry
//!
//! Every element, layer and map a level is made of is registered here under
//! its `__class__` tag. [`level_registry`] builds the registry on first use;
//! loading then dispatches through it without knowing concrete types.

use delver_map_core::{DeserializerRegistry, GridElement, Position, SerializationError, Tile, Tileset};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::{
    AssetPaths, EditorTilemap, EditorTilemapLayer, MixedMap, WorldObjectRepresentation,
    WorldObjectsLayer, WorldObjectsMap,
};

fn wrong_kind(expected: &str, found: &str) -> SerializationError {
    SerializationError::WrongKind {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Any element a level layer can hold
#[derive(Debug, Clone, PartialEq)]
pub enum LevelElement {
    Tile(Tile),
    WorldObject(WorldObjectRepresentation),
}

impl LevelElement {
    pub fn class(&self) -> &'static str {
        match self {
            LevelElement::Tile(_) => Tile::CLASS,
            LevelElement::WorldObject(_) => WorldObjectRepresentation::CLASS,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LevelElement::Tile(tile) => tile.position,
            LevelElement::WorldObject(object) => object.position,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LevelElement::Tile(tile) => &tile.name,
            LevelElement::WorldObject(object) => &object.name,
        }
    }

    pub fn into_tile(self) -> Result<Tile, SerializationError> {
        match self {
            LevelElement::Tile(tile) => Ok(tile),
            other => Err(wrong_kind(Tile::CLASS, other.class())),
        }
    }

    pub fn into_world_object(self) -> Result<WorldObjectRepresentation, SerializationError> {
        match self {
            LevelElement::WorldObject(object) => Ok(object),
            other => Err(wrong_kind(WorldObjectRepresentation::CLASS, other.class())),
        }
    }
}

impl From<Tile> for LevelElement {
    fn from(tile: Tile) -> Self {
        LevelElement::Tile(tile)
    }
}

impl From<WorldObjectRepresentation> for LevelElement {
    fn from(object: WorldObjectRepresentation) -> Self {
        LevelElement::WorldObject(object)
    }
}

/// Any layer a level sub-map can hold
#[derive(Debug, Clone)]
pub enum LevelLayer {
    Tilemap(EditorTilemapLayer),
    WorldObjects(WorldObjectsLayer),
}

impl LevelLayer {
    pub fn class(&self) -> &'static str {
        match self {
            LevelLayer::Tilemap(_) => EditorTilemapLayer::CLASS,
            LevelLayer::WorldObjects(_) => WorldObjectsLayer::CLASS,
        }
    }

    pub fn into_tilemap_layer(self) -> Result<EditorTilemapLayer, SerializationError> {
        match self {
            LevelLayer::Tilemap(layer) => Ok(layer),
            other => Err(wrong_kind(EditorTilemapLayer::CLASS, other.class())),
        }
    }

    pub fn into_world_objects_layer(self) -> Result<WorldObjectsLayer, SerializationError> {
        match self {
            LevelLayer::WorldObjects(layer) => Ok(layer),
            other => Err(wrong_kind(WorldObjectsLayer::CLASS, other.class())),
        }
    }
}

/// Any map a level payload can hold
#[derive(Debug, Clone)]
pub enum LevelMap {
    Mixed(MixedMap),
    Tilemap(EditorTilemap),
    WorldObjects(WorldObjectsMap),
}

impl LevelMap {
    pub fn class(&self) -> &'static str {
        match self {
            LevelMap::Mixed(_) => MixedMap::CLASS,
            LevelMap::Tilemap(_) => EditorTilemap::CLASS,
            LevelMap::WorldObjects(_) => WorldObjectsMap::CLASS,
        }
    }

    pub fn into_mixed(self) -> Result<MixedMap, SerializationError> {
        match self {
            LevelMap::Mixed(map) => Ok(map),
            other => Err(wrong_kind(MixedMap::CLASS, other.class())),
        }
    }

    pub fn into_tilemap(self) -> Result<EditorTilemap, SerializationError> {
        match self {
            LevelMap::Tilemap(map) => Ok(map),
            other => Err(wrong_kind(EditorTilemap::CLASS, other.class())),
        }
    }

    pub fn into_world_objects(self) -> Result<WorldObjectsMap, SerializationError> {
        match self {
            LevelMap::WorldObjects(map) => Ok(map),
            other => Err(wrong_kind(WorldObjectsMap::CLASS, other.class())),
        }
    }
}

/// State carried through one load: path resolution and the tileset cache
#[derive(Debug)]
pub struct LoadContext {
    paths: AssetPaths,
    tilesets: HashMap<String, Arc<Tileset>>,
}

impl LoadContext {
    pub fn new(paths: AssetPaths) -> Self {
        Self {
            paths,
            tilesets: HashMap::new(),
        }
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// The tileset saved under `relative_path`, loaded once per context
    pub fn tileset(&mut self, relative_path: &str) -> Arc<Tileset> {
        let paths = &self.paths;
        self.tilesets
            .entry(relative_path.to_string())
            .or_insert_with(|| Arc::new(Tileset::new(paths.from_relative(relative_path))))
            .clone()
    }

    pub fn tileset_count(&self) -> usize {
        self.tilesets.len()
    }
}

pub type LevelRegistry = DeserializerRegistry<LevelElement, LevelLayer, LevelMap, LoadContext>;

fn deserialize_tile(payload: &Value) -> Result<LevelElement, SerializationError> {
    Ok(LevelElement::Tile(Tile::deserialize(payload)?))
}

fn deserialize_world_object(payload: &Value) -> Result<LevelElement, SerializationError> {
    Ok(LevelElement::WorldObject(WorldObjectRepresentation::deserialize(
        payload,
    )?))
}

fn deserialize_tilemap_layer(
    payload: &Value,
    registry: &LevelRegistry,
    context: &mut LoadContext,
) -> Result<LevelLayer, SerializationError> {
    EditorTilemapLayer::from_tagged(payload, registry, context).map(LevelLayer::Tilemap)
}

fn deserialize_world_objects_layer(
    payload: &Value,
    registry: &LevelRegistry,
    context: &mut LoadContext,
) -> Result<LevelLayer, SerializationError> {
    WorldObjectsLayer::from_tagged(payload, registry, context).map(LevelLayer::WorldObjects)
}

fn deserialize_editor_tilemap(
    payload: &Value,
    registry: &LevelRegistry,
    context: &mut LoadContext,
) -> Result<LevelMap, SerializationError> {
    EditorTilemap::from_tagged(payload, registry, context).map(LevelMap::Tilemap)
}

fn deserialize_world_objects_map(
    payload: &Value,
    registry: &LevelRegistry,
    context: &mut LoadContext,
) -> Result<LevelMap, SerializationError> {
    WorldObjectsMap::from_tagged(payload, registry, context).map(LevelMap::WorldObjects)
}

fn deserialize_mixed_map(
    payload: &Value,
    registry: &LevelRegistry,
    context: &mut LoadContext,
) -> Result<LevelMap, SerializationError> {
    MixedMap::from_tagged(payload, registry, context).map(LevelMap::Mixed)
}

/// Register every level payload type. Safe to call repeatedly.
pub fn initialize_level_deserializers(registry: &mut LevelRegistry) {
    registry.register_element(Tile::CLASS, deserialize_tile);
    registry.register_element(WorldObjectRepresentation::CLASS, deserialize_world_object);
    registry.register_layer(EditorTilemapLayer::CLASS, deserialize_tilemap_layer);
    registry.register_layer(WorldObjectsLayer::CLASS, deserialize_world_objects_layer);
    registry.register_map(EditorTilemap::CLASS, deserialize_editor_tilemap);
    registry.register_map(WorldObjectsMap::CLASS, deserialize_world_objects_map);
    registry.register_map(MixedMap::CLASS, deserialize_mixed_map);
}

/// The process-wide registry, populated on first access
pub fn level_registry() -> &'static LevelRegistry {
    static REGISTRY: OnceLock<LevelRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = LevelRegistry::new();
        initialize_level_deserializers(&mut registry);
        registry
    })
}
