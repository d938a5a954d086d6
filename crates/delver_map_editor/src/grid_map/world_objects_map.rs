//! The object sub-map

use delver_map_core::registry::{parse_field, tagged};
use delver_map_core::{
    GridBounds, GridElement, GridError, GridMap, GridSize, MapLayer, Position, SerializationError,
};
use serde::Serialize;
use serde_json::Value;

use super::editor_tilemap::parse_bounds;
use super::{concurrence_table, partners_of, ConcurrenceTable};
use crate::serialization::{LevelRegistry, LoadContext};
use crate::{AssetPaths, WorldObjectRepresentation, WorldObjectsLayer};

/// Layers of placed world objects.
///
/// Uniqueness and variation exclusivity are the placer's job: this map
/// only creates, removes and evicts.
#[derive(Debug, Clone)]
pub struct WorldObjectsMap {
    grid: GridMap<WorldObjectsLayer>,
}

#[derive(Serialize)]
struct WorldObjectsPayload {
    tile_size: GridSize,
    grid_size: GridSize,
    min_grid_size: GridSize,
    max_grid_size: GridSize,
    layers: Vec<Value>,
}

impl WorldObjectsMap {
    pub const CLASS: &'static str = "WorldObjectsMap";

    pub fn new(tile_size: GridSize, bounds: GridBounds) -> Self {
        Self {
            grid: GridMap::new(tile_size, bounds),
        }
    }

    pub fn grid(&self) -> &GridMap<WorldObjectsLayer> {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut GridMap<WorldObjectsLayer> {
        &mut self.grid
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid.grid_size()
    }

    pub fn add_layer(&mut self, layer: WorldObjectsLayer) -> Result<(), GridError> {
        self.grid.add_layer(layer)
    }

    pub fn add_layer_concurrence(&mut self, a: &str, b: &str) -> Result<(), GridError> {
        self.grid.add_layer_concurrence(a, b)
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.grid.has_layer(name)
    }

    pub fn get_layer(&self, name: &str) -> Result<&WorldObjectsLayer, GridError> {
        self.grid.get_layer(name)
    }

    pub fn get_layer_mut(&mut self, name: &str) -> Result<&mut WorldObjectsLayer, GridError> {
        self.grid.get_layer_mut(name)
    }

    pub fn layers(&self) -> &[WorldObjectsLayer] {
        self.grid.layers()
    }

    pub fn all_world_objects(&self) -> impl Iterator<Item = &WorldObjectRepresentation> {
        self.grid.all_elements()
    }

    /// Place a new object on `layer`, evicting whatever it displaces on this
    /// layer or its concurrent object layers
    pub fn create_world_object_at(
        &mut self,
        layer: &str,
        position: Position,
        name: &str,
        tags: Vec<String>,
        unique: bool,
    ) -> Result<Vec<(String, WorldObjectRepresentation)>, GridError> {
        let object = WorldObjectRepresentation::new(position, name)
            .with_tags(tags)
            .with_unique(unique);
        self.grid.add_element(layer, object)
    }

    pub fn remove_world_object_at(
        &mut self,
        layer: &str,
        position: Position,
    ) -> Result<Option<WorldObjectRepresentation>, GridError> {
        self.grid.remove_element_at(layer, position)
    }

    pub fn remove_world_objects_where<F>(
        &mut self,
        layer: &str,
        predicate: F,
    ) -> Result<Vec<WorldObjectRepresentation>, GridError>
    where
        F: FnMut(&WorldObjectRepresentation) -> bool,
    {
        Ok(self
            .grid
            .get_layer_mut(layer)?
            .remove_elements_where(predicate))
    }

    /// Recompute every object's lock flag from its position
    pub(crate) fn apply_locks<F>(&mut self, is_locked: F)
    where
        F: Fn(Position) -> bool,
    {
        for layer in self.grid.layers_mut() {
            for object in layer.elements_mut() {
                let locked = is_locked(object.position());
                object.set_locked(locked);
            }
        }
    }

    pub fn concurrence_table(&self) -> ConcurrenceTable {
        concurrence_table(self.grid.concurrences())
    }

    pub fn to_tagged(
        &self,
        paths: &AssetPaths,
        concurrences: &ConcurrenceTable,
    ) -> Result<Value, SerializationError> {
        let layers = self
            .grid
            .layers()
            .iter()
            .map(|layer| layer.to_tagged(paths, &partners_of(concurrences, layer.name())))
            .collect::<Result<Vec<_>, _>>()?;
        let bounds = self.grid.bounds();
        tagged(
            Self::CLASS,
            &WorldObjectsPayload {
                tile_size: self.grid.tile_size(),
                grid_size: bounds.grid_size,
                min_grid_size: bounds.min_grid_size,
                max_grid_size: bounds.max_grid_size,
                layers,
            },
        )
    }

    /// Rebuild layers. Concurrences are restored by the owning map.
    pub fn from_tagged(
        payload: &Value,
        registry: &LevelRegistry,
        context: &mut LoadContext,
    ) -> Result<Self, SerializationError> {
        let tile_size: GridSize = parse_field(payload, "tile_size")?;
        let mut map = Self::new(tile_size, parse_bounds(payload)?);

        let layers: Vec<Value> = parse_field(payload, "layers")?;
        for layer in &layers {
            let layer = registry
                .deserialize_layer(layer, context)?
                .into_world_objects_layer()?;
            for object in layer.elements() {
                map.grid.check_in_bounds(object.position)?;
            }
            map.add_layer(layer)?;
        }
        Ok(map)
    }
}
