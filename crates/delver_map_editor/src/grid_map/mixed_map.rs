//! The composite map: one tile sub-map and one object sub-map in lockstep

use delver_map_core::registry::{field, parse_field, parse_field_or_default, tagged};
use delver_map_core::{
    Axis, Edge, GridBounds, GridError, GridSize, MapLayer, Position, SerializationError,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use super::{concurrence_table, ConcurrenceTable, EditorTilemap, TilemapEditor, WorldObjectsMap};
use crate::serialization::{LevelElement, LevelRegistry, LoadContext};
use crate::{
    AssetPaths, EditorTilemapLayer, LayerDisplay, TilemapKind, WorldObjectRepresentation,
    WorldObjectsLayer,
};

/// A layer of either sub-map
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    Tilemap(&'a EditorTilemapLayer),
    WorldObjects(&'a WorldObjectsLayer),
}

impl<'a> LayerRef<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            LayerRef::Tilemap(layer) => layer.grid_layer().name(),
            LayerRef::WorldObjects(layer) => layer.grid_layer().name(),
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            LayerRef::Tilemap(layer) => layer.len(),
            LayerRef::WorldObjects(layer) => layer.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_element_at(&self, position: Position) -> bool {
        match *self {
            LayerRef::Tilemap(layer) => layer.has_element_at(position),
            LayerRef::WorldObjects(layer) => layer.has_element_at(position),
        }
    }

    pub fn display(&self) -> LayerDisplay {
        match *self {
            LayerRef::Tilemap(layer) => layer.display,
            LayerRef::WorldObjects(layer) => layer.display,
        }
    }

    pub fn icon_path(&self) -> &'a Path {
        match *self {
            LayerRef::Tilemap(layer) => &layer.icon_path,
            LayerRef::WorldObjects(layer) => &layer.icon_path,
        }
    }
}

/// An occupant removed by a resize or evicted by a placement
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedOccupant {
    pub layer: String,
    pub element: LevelElement,
}

impl RemovedOccupant {
    fn new(layer: String, element: impl Into<LevelElement>) -> Self {
        Self {
            layer,
            element: element.into(),
        }
    }
}

#[derive(Serialize)]
struct MixedMapPayload<'a> {
    tile_size: GridSize,
    grid_size: GridSize,
    min_grid_size: GridSize,
    max_grid_size: GridSize,
    layer_order: &'a [String],
    tilemap: Value,
    world_objects_map: Value,
}

/// The level's map: tile and object layers sharing one grid.
///
/// This is the only entry point for resizing. Both sub-maps are resized
/// together so they always report the same grid size.
#[derive(Debug, Clone)]
pub struct MixedMap {
    tilemap: EditorTilemap,
    world_objects_map: WorldObjectsMap,
    /// Merged draw order of the layers of both sub-maps
    layer_order: Vec<String>,
    /// Concurrences between a tile layer and an object layer
    cross_concurrences: Vec<(String, String)>,
}

impl MixedMap {
    pub const CLASS: &'static str = "MixedMap";

    pub fn new(kind: TilemapKind, tile_size: GridSize, bounds: GridBounds) -> Self {
        Self {
            tilemap: EditorTilemap::new(kind, tile_size, bounds),
            world_objects_map: WorldObjectsMap::new(tile_size, bounds),
            layer_order: Vec::new(),
            cross_concurrences: Vec::new(),
        }
    }

    pub fn tilemap(&self) -> &EditorTilemap {
        &self.tilemap
    }

    pub(crate) fn tilemap_mut(&mut self) -> &mut EditorTilemap {
        &mut self.tilemap
    }

    pub fn world_objects_map(&self) -> &WorldObjectsMap {
        &self.world_objects_map
    }

    /// Tile editing view with access back to this map for dynamic resizing
    pub fn tilemap_editor(&mut self) -> TilemapEditor<'_> {
        TilemapEditor::new(self)
    }

    pub fn kind(&self) -> TilemapKind {
        self.tilemap.kind()
    }

    pub fn tile_size(&self) -> GridSize {
        self.tilemap.grid().tile_size()
    }

    pub fn grid_size(&self) -> GridSize {
        self.tilemap.grid_size()
    }

    pub fn min_grid_size(&self) -> GridSize {
        self.bounds().min_grid_size
    }

    pub fn max_grid_size(&self) -> GridSize {
        self.bounds().max_grid_size
    }

    pub fn bounds(&self) -> &GridBounds {
        self.tilemap.bounds()
    }

    // Layers

    pub fn add_tilemap_layer(&mut self, layer: EditorTilemapLayer) -> Result<(), GridError> {
        let name = layer.grid_layer().name();
        if self.world_objects_map.has_layer(name) {
            return Err(GridError::DuplicateLayer(name.to_string()));
        }
        self.tilemap.add_layer(layer)
    }

    pub fn add_world_objects_layer(&mut self, layer: WorldObjectsLayer) -> Result<(), GridError> {
        let name = layer.grid_layer().name();
        if self.tilemap.has_layer(name) {
            return Err(GridError::DuplicateLayer(name.to_string()));
        }
        self.world_objects_map.add_layer(layer)
    }

    /// Set the merged layer order. Names with no layer in either sub-map are skipped.
    pub fn populate_layers(&mut self, layer_order: &[String]) {
        self.layer_order = layer_order
            .iter()
            .filter(|name| self.has_layer(name))
            .cloned()
            .collect();
    }

    pub fn layer_order(&self) -> &[String] {
        &self.layer_order
    }

    /// Layers of both sub-maps in draw order
    pub fn layers(&self) -> Vec<LayerRef<'_>> {
        self.layer_order
            .iter()
            .filter_map(|name| self.get_layer(name).ok())
            .collect()
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.tilemap.has_layer(name) || self.world_objects_map.has_layer(name)
    }

    pub fn get_layer(&self, name: &str) -> Result<LayerRef<'_>, GridError> {
        if let Ok(layer) = self.tilemap.get_layer(name) {
            return Ok(LayerRef::Tilemap(layer));
        }
        self.world_objects_map
            .get_layer(name)
            .map(LayerRef::WorldObjects)
    }

    pub fn get_tilemap_layer(&self, name: &str) -> Result<&EditorTilemapLayer, GridError> {
        self.tilemap.get_layer(name)
    }

    pub fn get_tilemap_layer_mut(&mut self, name: &str) -> Result<&mut EditorTilemapLayer, GridError> {
        self.tilemap.get_layer_mut(name)
    }

    pub fn get_world_objects_layer(&self, name: &str) -> Result<&WorldObjectsLayer, GridError> {
        self.world_objects_map.get_layer(name)
    }

    pub fn get_world_objects_layer_mut(
        &mut self,
        name: &str,
    ) -> Result<&mut WorldObjectsLayer, GridError> {
        self.world_objects_map.get_layer_mut(name)
    }

    // Concurrences

    /// Declare two layers mutually exclusive, in whichever sub-map holds them
    pub fn add_layer_concurrence(&mut self, a: &str, b: &str) -> Result<(), GridError> {
        if self.tilemap.has_layer(a) && self.tilemap.has_layer(b) {
            return self.tilemap.add_layer_concurrence(a, b);
        }
        if self.world_objects_map.has_layer(a) && self.world_objects_map.has_layer(b) {
            return self.world_objects_map.add_layer_concurrence(a, b);
        }
        for name in [a, b] {
            if !self.has_layer(name) {
                return Err(GridError::LayerNotFound(name.to_string()));
            }
        }
        let declared = self
            .cross_concurrences
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a));
        if !declared {
            self.cross_concurrences.push((a.to_string(), b.to_string()));
        }
        Ok(())
    }

    /// Every concurrence, across and within the sub-maps
    pub fn concurrence_table(&self) -> ConcurrenceTable {
        concurrence_table(
            self.tilemap
                .grid()
                .concurrences()
                .iter()
                .chain(self.world_objects_map.grid().concurrences())
                .chain(&self.cross_concurrences),
        )
    }

    pub fn concurrent_layers(&self, name: &str) -> Vec<String> {
        super::partners_of(&self.concurrence_table(), name)
    }

    fn cross_partners(&self, name: &str) -> Vec<String> {
        self.cross_concurrences
            .iter()
            .filter_map(|(a, b)| {
                if a == name {
                    Some(b.clone())
                } else if b == name {
                    Some(a.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    // Placement

    /// Create `layer`'s tile type at `position` unless one is there, evicting
    /// concurrent occupants of both sub-maps. Skips formatting and dynamic checks.
    pub(crate) fn place_tile(
        &mut self,
        layer: &str,
        position: Position,
    ) -> Result<Option<Vec<RemovedOccupant>>, GridError> {
        let Some(evicted) = self.tilemap.place_tile(layer, position)? else {
            return Ok(None);
        };
        let mut removed: Vec<RemovedOccupant> = evicted
            .into_iter()
            .map(|(layer, tile)| RemovedOccupant::new(layer, tile))
            .collect();
        for partner in self.cross_partners(layer) {
            if !self.world_objects_map.has_layer(&partner) {
                continue;
            }
            if let Some(object) = self
                .world_objects_map
                .remove_world_object_at(&partner, position)?
            {
                removed.push(RemovedOccupant::new(partner, object));
            }
        }
        Ok(Some(removed))
    }

    /// Place a world object, evicting concurrent tiles and making sure a floor
    /// tile supports it in walls-and-floor maps
    pub fn create_world_object_at(
        &mut self,
        layer: &str,
        position: Position,
        name: &str,
        tags: Vec<String>,
        unique: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let mut removed: Vec<RemovedOccupant> = self
            .world_objects_map
            .create_world_object_at(layer, position, name, tags, unique)?
            .into_iter()
            .map(|(layer, object)| RemovedOccupant::new(layer, object))
            .collect();

        for partner in self.cross_partners(layer) {
            if !self.tilemap.has_layer(&partner) {
                continue;
            }
            if let Some(tile) = self.tilemap.remove_tile_at(&partner, position, false)? {
                removed.push(RemovedOccupant::new(partner, tile));
            }
        }
        self.tilemap.format_around(position);

        if let Some(floor) = self.kind().secondary_layer() {
            if self.tilemap.has_layer(floor) && self.tilemap.get_tile_at(floor, position).is_none() {
                removed.extend(self.tilemap_editor().create_basic_floor_at(position, true)?);
            }
        }
        self.sync_object_locks();
        Ok(removed)
    }

    pub fn remove_world_object_at(
        &mut self,
        layer: &str,
        position: Position,
    ) -> Result<Option<WorldObjectRepresentation>, GridError> {
        self.world_objects_map.remove_world_object_at(layer, position)
    }

    pub(crate) fn remove_world_objects_where<F>(
        &mut self,
        layer: &str,
        predicate: F,
    ) -> Result<Vec<WorldObjectRepresentation>, GridError>
    where
        F: FnMut(&WorldObjectRepresentation) -> bool,
    {
        self.world_objects_map
            .remove_world_objects_where(layer, predicate)
    }

    // Resizing

    /// Grow by up to `size` cells towards `direction` and fill the new cells
    /// with default tiles. Returns the new positions, empty when at max.
    pub fn expand_towards(&mut self, direction: Edge, size: u32) -> Vec<Position> {
        let amount = size.min(self.bounds().expandable_by(direction.axis()));
        if amount == 0 {
            return Vec::new();
        }

        self.unlock_edge(direction);
        let positions = self.tilemap.grid_mut().expand_towards(direction, amount);
        self.world_objects_map
            .grid_mut()
            .expand_towards(direction, amount);

        self.fill_new_positions(&positions);
        self.refresh_edge_locks();
        positions
    }

    /// Shrink by up to `size` cells towards `direction`, deleting everything in
    /// the removed strip and walling off the new boundary.
    pub fn reduce_towards(&mut self, direction: Edge, size: u32) -> Vec<RemovedOccupant> {
        let amount = size.min(self.bounds().reducible_by(direction.axis()));
        if amount == 0 {
            return Vec::new();
        }

        let mut removed: Vec<RemovedOccupant> = self
            .tilemap
            .grid_mut()
            .reduce_towards(direction, amount)
            .into_iter()
            .map(|(layer, tile)| RemovedOccupant::new(layer, tile))
            .collect();
        removed.extend(
            self.world_objects_map
                .grid_mut()
                .reduce_towards(direction, amount)
                .into_iter()
                .map(|(layer, object)| RemovedOccupant::new(layer, object)),
        );

        removed.extend(self.refill_boundary(direction));
        self.refresh_edge_locks();
        removed
    }

    /// Fill freshly added cells: floor inside, primary tiles on the border.
    /// Every tile is created before any is formatted.
    fn fill_new_positions(&mut self, positions: &[Position]) {
        let kind = self.kind();
        let primary = kind.primary_layer();
        match kind.secondary_layer() {
            Some(secondary) => {
                self.fill_with(secondary, positions);
                let border: Vec<Position> = positions
                    .iter()
                    .copied()
                    .filter(|position| !self.bounds().edges_of(*position).is_empty())
                    .collect();
                self.fill_with(primary, &border);
            }
            None => {
                self.fill_with(primary, positions);
            }
        }
        self.tilemap.format_positions(positions);
    }

    fn fill_with(&mut self, layer: &str, positions: &[Position]) -> Vec<RemovedOccupant> {
        if !self.tilemap.has_layer(layer) {
            return Vec::new();
        }
        let mut removed = Vec::new();
        for position in positions {
            match self.place_tile(layer, *position) {
                Ok(evicted) => removed.extend(evicted.unwrap_or_default()),
                Err(error) => warn!("could not fill {position} on '{layer}': {error}"),
            }
        }
        removed
    }

    /// Cover the boundary of `edge` with primary tiles, evicting what they displace
    fn refill_boundary(&mut self, edge: Edge) -> Vec<RemovedOccupant> {
        let positions = self.bounds().edge_positions(Some(edge), 0);
        let removed = self.fill_with(self.kind().primary_layer(), &positions);
        self.tilemap.format_positions(&positions);
        removed
    }

    /// Spread `size` per direction over several directions.
    ///
    /// Per axis the total is capped by the room left, split evenly, and the
    /// remainder goes to the later direction (right, bottom).
    pub fn multidirectional_expand_towards(&mut self, directions: &[Edge], size: u32) -> Vec<Position> {
        let mut positions: Vec<Position> = Vec::new();
        for (direction, amount) in self.split_budget(directions, size, true) {
            let before = self.grid_size();
            let added = self.expand_towards(direction, amount);
            if direction.is_leading() {
                let axis = direction.axis();
                let grown = (self.grid_size().along(axis) - before.along(axis)) as i32;
                let (dx, dy) = match axis {
                    Axis::Horizontal => (grown, 0),
                    Axis::Vertical => (0, grown),
                };
                for position in &mut positions {
                    *position = position.offset(dx, dy);
                }
            }
            positions.extend(added);
        }
        positions.sort();
        positions.dedup();
        positions
    }

    pub fn multidirectional_reduce_towards(
        &mut self,
        directions: &[Edge],
        size: u32,
    ) -> Vec<RemovedOccupant> {
        let mut removed = Vec::new();
        for (direction, amount) in self.split_budget(directions, size, false) {
            removed.extend(self.reduce_towards(direction, amount));
        }
        removed
    }

    fn split_budget(&self, directions: &[Edge], size: u32, expanding: bool) -> Vec<(Edge, u32)> {
        let mut plan = Vec::new();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let ordered: Vec<Edge> = axis
                .edges()
                .into_iter()
                .filter(|edge| directions.contains(edge))
                .collect();
            if ordered.is_empty() {
                continue;
            }
            let available = if expanding {
                self.bounds().expandable_by(axis)
            } else {
                self.bounds().reducible_by(axis)
            };
            let count = ordered.len() as u32;
            let total = available.min(size.saturating_mul(count));
            let (share, remainder) = (total / count, total % count);
            for (index, edge) in ordered.iter().enumerate() {
                let last = index + 1 == ordered.len();
                let amount = if last { share + remainder } else { share };
                if amount > 0 {
                    plan.push((*edge, amount));
                }
            }
        }
        plan
    }

    // Edge locks

    pub fn lock_edge(&mut self, edge: Edge) {
        self.tilemap.lock_edge(edge);
        self.sync_object_locks();
    }

    pub fn unlock_edge(&mut self, edge: Edge) {
        self.tilemap.unlock_edge(edge);
        self.sync_object_locks();
    }

    pub fn lock_edge_axis_if_needed(&mut self, edge: Edge) -> bool {
        let locked = self.tilemap.lock_edge_axis_if_needed(edge);
        self.sync_object_locks();
        locked
    }

    pub fn unlock_edge_if_expandable(&mut self, edge: Edge) -> bool {
        let unlocked = self.tilemap.unlock_edge_if_expandable(edge);
        self.sync_object_locks();
        unlocked
    }

    /// Lock exactly the edges whose axis is at its maximum size
    pub fn refresh_edge_locks(&mut self) {
        self.tilemap.refresh_edge_locks();
        self.sync_object_locks();
    }

    pub fn is_edge_locked(&self, edge: Edge) -> bool {
        self.tilemap.is_edge_locked(edge)
    }

    fn sync_object_locks(&mut self) {
        let tilemap = &self.tilemap;
        self.world_objects_map
            .apply_locks(|position| tilemap.is_on_locked_edge(position));
    }

    // Serialization

    pub fn to_tagged(&self, paths: &AssetPaths) -> Result<Value, SerializationError> {
        let concurrences = self.concurrence_table();
        let bounds = self.bounds();
        tagged(
            Self::CLASS,
            &MixedMapPayload {
                tile_size: self.tile_size(),
                grid_size: bounds.grid_size,
                min_grid_size: bounds.min_grid_size,
                max_grid_size: bounds.max_grid_size,
                layer_order: &self.layer_order,
                tilemap: self.tilemap.to_tagged(paths, &concurrences)?,
                world_objects_map: self.world_objects_map.to_tagged(paths, &concurrences)?,
            },
        )
    }

    /// Rebuild both sub-maps, then the layer order, then the concurrences,
    /// which name layers that must already exist
    pub fn from_tagged(
        payload: &Value,
        registry: &LevelRegistry,
        context: &mut LoadContext,
    ) -> Result<Self, SerializationError> {
        let tilemap_payload = field(payload, "tilemap")?;
        let objects_payload = field(payload, "world_objects_map")?;
        let tilemap = registry
            .deserialize_map(tilemap_payload, context)?
            .into_tilemap()?;
        let world_objects_map = registry
            .deserialize_map(objects_payload, context)?
            .into_world_objects()?;

        let grid_size: GridSize = parse_field(payload, "grid_size")?;
        for (label, sub_size) in [
            (EditorTilemap::CLASS, tilemap.grid_size()),
            (WorldObjectsMap::CLASS, world_objects_map.grid_size()),
        ] {
            if sub_size != grid_size {
                return Err(SerializationError::Mismatch(format!(
                    "{label} is {sub_size} but the map is {grid_size}"
                )));
            }
        }

        let mut map = MixedMap {
            tilemap,
            world_objects_map,
            layer_order: Vec::new(),
            cross_concurrences: Vec::new(),
        };
        let layer_order: Vec<String> = parse_field_or_default(payload, "layer_order")?;
        map.populate_layers(&layer_order);

        for section in [tilemap_payload, objects_payload] {
            let layers: Vec<Value> = parse_field(section, "layers")?;
            for layer in &layers {
                let name: String = parse_field(layer, "name")?;
                let partners: Vec<String> = parse_field_or_default(layer, "concurrent_layers")?;
                for partner in partners {
                    map.add_layer_concurrence(&name, &partner)?;
                }
            }
        }
        map.sync_object_locks();
        Ok(map)
    }
}
