//! Editor layers: grid layers plus tileset, icon and display metadata

use delver_map_core::registry::{parse_field, parse_field_or_default, tagged};
use delver_map_core::{GridLayer, MapLayer, SerializationError, Tile, Tileset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::serialization::{LevelRegistry, LoadContext};
use crate::{AssetPaths, WorldObjectRepresentation};

/// Presentation-only layer state. Excluded from the level hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDisplay {
    pub visible: bool,
}

impl Default for LayerDisplay {
    fn default() -> Self {
        Self { visible: true }
    }
}

#[derive(Serialize)]
struct LayerPayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tileset: Option<String>,
    icon_path: String,
    display: LayerDisplay,
    concurrent_layers: &'a [String],
    elements: Vec<Value>,
}

/// A tile layer drawn from one tileset
#[derive(Debug, Clone)]
pub struct EditorTilemapLayer {
    layer: GridLayer<Tile>,
    tileset: Arc<Tileset>,
    pub icon_path: PathBuf,
    pub display: LayerDisplay,
}

impl EditorTilemapLayer {
    pub const CLASS: &'static str = "EditorTilemapLayer";

    pub fn new(name: impl Into<String>, tileset: Arc<Tileset>, icon_path: impl Into<PathBuf>) -> Self {
        Self {
            layer: GridLayer::new(name),
            tileset,
            icon_path: icon_path.into(),
            display: LayerDisplay::default(),
        }
    }

    pub fn tileset(&self) -> &Arc<Tileset> {
        &self.tileset
    }

    pub fn icon_path(&self) -> &Path {
        &self.icon_path
    }

    /// Serialize with project-relative asset paths
    pub fn to_tagged(
        &self,
        paths: &AssetPaths,
        concurrent_layers: &[String],
    ) -> Result<Value, SerializationError> {
        tagged(
            Self::CLASS,
            &LayerPayload {
                name: self.layer.name(),
                tileset: Some(paths.to_relative(self.tileset.path())),
                icon_path: paths.to_relative(&self.icon_path),
                display: self.display,
                concurrent_layers,
                elements: self.layer.elements_to_tagged()?,
            },
        )
    }

    /// Rebuild from a tagged payload. Tilesets are shared through the
    /// context cache, keyed by their saved relative path.
    pub fn from_tagged(
        payload: &Value,
        registry: &LevelRegistry,
        context: &mut LoadContext,
    ) -> Result<Self, SerializationError> {
        let name: String = parse_field(payload, "name")?;
        let tileset_path: String = parse_field(payload, "tileset")?;
        let icon_path: String = parse_field(payload, "icon_path")?;

        let mut layer = Self::new(
            name,
            context.tileset(&tileset_path),
            context.paths().from_relative(&icon_path),
        );
        layer.display = parse_field_or_default(payload, "display")?;

        let elements: Vec<Value> = parse_field_or_default(payload, "elements")?;
        for element in &elements {
            let tile = registry.deserialize_element(element)?.into_tile()?;
            layer.layer.add_element(tile);
        }
        Ok(layer)
    }
}

impl Deref for EditorTilemapLayer {
    type Target = GridLayer<Tile>;

    fn deref(&self) -> &Self::Target {
        &self.layer
    }
}

impl DerefMut for EditorTilemapLayer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.layer
    }
}

impl MapLayer for EditorTilemapLayer {
    type Element = Tile;

    fn grid_layer(&self) -> &GridLayer<Tile> {
        &self.layer
    }

    fn grid_layer_mut(&mut self) -> &mut GridLayer<Tile> {
        &mut self.layer
    }
}

/// A layer of placed world objects
#[derive(Debug, Clone)]
pub struct WorldObjectsLayer {
    layer: GridLayer<WorldObjectRepresentation>,
    pub icon_path: PathBuf,
    pub display: LayerDisplay,
}

impl WorldObjectsLayer {
    pub const CLASS: &'static str = "WorldObjectsLayer";

    pub fn new(name: impl Into<String>, icon_path: impl Into<PathBuf>) -> Self {
        Self {
            layer: GridLayer::new(name),
            icon_path: icon_path.into(),
            display: LayerDisplay::default(),
        }
    }

    pub fn icon_path(&self) -> &Path {
        &self.icon_path
    }

    /// Objects created from the canvas object `canvas_object_name`
    pub fn objects_from(&self, canvas_object_name: &str) -> Vec<&WorldObjectRepresentation> {
        self.layer
            .elements()
            .filter(|object| object.canvas_object_name() == canvas_object_name)
            .collect()
    }

    pub fn to_tagged(
        &self,
        paths: &AssetPaths,
        concurrent_layers: &[String],
    ) -> Result<Value, SerializationError> {
        tagged(
            Self::CLASS,
            &LayerPayload {
                name: self.layer.name(),
                tileset: None,
                icon_path: paths.to_relative(&self.icon_path),
                display: self.display,
                concurrent_layers,
                elements: self.layer.elements_to_tagged()?,
            },
        )
    }

    pub fn from_tagged(
        payload: &Value,
        registry: &LevelRegistry,
        context: &mut LoadContext,
    ) -> Result<Self, SerializationError> {
        let name: String = parse_field(payload, "name")?;
        let icon_path: String = parse_field(payload, "icon_path")?;

        let mut layer = Self::new(name, context.paths().from_relative(&icon_path));
        layer.display = parse_field_or_default(payload, "display")?;

        let elements: Vec<Value> = parse_field_or_default(payload, "elements")?;
        for element in &elements {
            let object = registry.deserialize_element(element)?.into_world_object()?;
            layer.layer.add_element(object);
        }
        Ok(layer)
    }
}

impl Deref for WorldObjectsLayer {
    type Target = GridLayer<WorldObjectRepresentation>;

    fn deref(&self) -> &Self::Target {
        &self.layer
    }
}

impl DerefMut for WorldObjectsLayer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.layer
    }
}

impl MapLayer for WorldObjectsLayer {
    type Element = WorldObjectRepresentation;

    fn grid_layer(&self) -> &GridLayer<WorldObjectRepresentation> {
        &self.layer
    }

    fn grid_layer_mut(&mut self) -> &mut GridLayer<WorldObjectRepresentation> {
        &mut self.layer
    }
}
