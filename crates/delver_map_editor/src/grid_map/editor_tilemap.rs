//! The tile sub-map and its edge locks

use delver_map_autotile::VariantTable;
use delver_map_core::registry::{parse_field, parse_field_or_default, tagged};
use delver_map_core::{
    Axis, Edge, GridBounds, GridError, GridMap, GridSize, MapLayer, Position, SerializationError,
    Tile,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

use super::{concurrence_table, partners_of, ConcurrenceTable};
use crate::serialization::{LevelRegistry, LoadContext};
use crate::{AssetPaths, EditorTilemapLayer, TilemapKind};

/// Tile layers of a level.
///
/// Edges in `locked_edges` have every occupant flagged `locked`; an edge is
/// locked once its axis reaches the maximum grid size.
#[derive(Debug, Clone)]
pub struct EditorTilemap {
    grid: GridMap<EditorTilemapLayer>,
    kind: TilemapKind,
    locked_edges: BTreeSet<Edge>,
}

#[derive(Serialize)]
struct TilemapPayload<'a> {
    kind: TilemapKind,
    tile_size: GridSize,
    grid_size: GridSize,
    min_grid_size: GridSize,
    max_grid_size: GridSize,
    locked_edges: &'a BTreeSet<Edge>,
    layers: Vec<Value>,
}

impl EditorTilemap {
    pub const CLASS: &'static str = "EditorTilemap";

    pub fn new(kind: TilemapKind, tile_size: GridSize, bounds: GridBounds) -> Self {
        Self {
            grid: GridMap::new(tile_size, bounds),
            kind,
            locked_edges: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> TilemapKind {
        self.kind
    }

    pub fn grid(&self) -> &GridMap<EditorTilemapLayer> {
        &self.grid
    }

    /// Resizing must go through the owning map so both sub-maps stay in step
    pub(crate) fn grid_mut(&mut self) -> &mut GridMap<EditorTilemapLayer> {
        &mut self.grid
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid.grid_size()
    }

    pub fn bounds(&self) -> &GridBounds {
        self.grid.bounds()
    }

    pub fn add_layer(&mut self, layer: EditorTilemapLayer) -> Result<(), GridError> {
        self.grid.add_layer(layer)
    }

    pub fn add_layer_concurrence(&mut self, a: &str, b: &str) -> Result<(), GridError> {
        self.grid.add_layer_concurrence(a, b)
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.grid.has_layer(name)
    }

    pub fn get_layer(&self, name: &str) -> Result<&EditorTilemapLayer, GridError> {
        self.grid.get_layer(name)
    }

    pub fn get_layer_mut(&mut self, name: &str) -> Result<&mut EditorTilemapLayer, GridError> {
        self.grid.get_layer_mut(name)
    }

    pub fn layers(&self) -> &[EditorTilemapLayer] {
        self.grid.layers()
    }

    pub fn get_tile_at(&self, layer: &str, position: Position) -> Option<&Tile> {
        self.grid.get_layer(layer).ok()?.get_tile_at(position)
    }

    /// Create the layer's tile type at `position` unless the cell is taken.
    ///
    /// Occupants of concurrent tile layers are evicted and returned. `None`
    /// means the cell already had a tile on this layer.
    pub(crate) fn place_tile(
        &mut self,
        layer: &str,
        position: Position,
    ) -> Result<Option<Vec<(String, Tile)>>, GridError> {
        self.grid.check_in_bounds(position)?;
        if self.grid.get_layer(layer)?.has_element_at(position) {
            return Ok(None);
        }

        let mut tile = self.new_tile(layer, position);
        tile.locked = self.is_on_locked_edge(position);
        self.grid.add_element(layer, tile).map(Some)
    }

    fn new_tile(&self, layer: &str, position: Position) -> Tile {
        let name = self.kind.tile_for_layer(layer).unwrap_or(layer);
        if layer == self.kind.primary_layer() {
            Tile::autotiled(position, name, VariantTable::with_shallow_variations(0))
        } else {
            Tile::new(position, name)
        }
    }

    pub(crate) fn remove_tile_at(
        &mut self,
        layer: &str,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Option<Tile>, GridError> {
        Ok(self
            .grid
            .get_layer_mut(layer)?
            .remove_tile_at(position, apply_formatting))
    }

    /// Reformat `position` and its neighbors on every layer
    pub fn format_around(&mut self, position: Position) {
        for layer in self.grid.layers_mut() {
            layer.format_around(position);
        }
    }

    /// Reformat a batch of cells and their neighbors, each cell once
    pub fn format_positions(&mut self, positions: &[Position]) {
        let cells: BTreeSet<Position> = positions
            .iter()
            .flat_map(|position| position.with_neighbors())
            .collect();
        for layer in self.grid.layers_mut() {
            for cell in &cells {
                layer.format_at(*cell);
            }
        }
    }

    pub fn format_all_tiles(&mut self) {
        for layer in self.grid.layers_mut() {
            layer.format_all();
        }
    }

    // Edge locks

    pub fn locked_edges(&self) -> &BTreeSet<Edge> {
        &self.locked_edges
    }

    pub fn is_edge_locked(&self, edge: Edge) -> bool {
        self.locked_edges.contains(&edge)
    }

    pub fn is_on_locked_edge(&self, position: Position) -> bool {
        let bounds = self.grid.bounds();
        self.locked_edges
            .iter()
            .any(|edge| bounds.is_on_edge(*edge, position))
    }

    /// Flag every occupant of `edge` as locked
    pub fn lock_edge(&mut self, edge: Edge) {
        self.locked_edges.insert(edge);
        self.grid.set_edge_locked(edge, true);
    }

    /// Clear the lock on `edge`. Corners shared with another locked edge stay locked.
    pub fn unlock_edge(&mut self, edge: Edge) {
        self.locked_edges.remove(&edge);
        let positions: Vec<Position> = self
            .grid
            .get_edge_positions(Some(edge), 0)
            .into_iter()
            .filter(|position| !self.is_on_locked_edge(*position))
            .collect();
        self.grid.set_locked_at(&positions, false);
    }

    /// Lock both edges of `edge`'s axis if that axis is at its maximum size
    pub fn lock_edge_axis_if_needed(&mut self, edge: Edge) -> bool {
        let axis = edge.axis();
        if !self.grid.bounds().is_at_max(axis) {
            return false;
        }
        for edge in axis.edges() {
            self.lock_edge(edge);
        }
        true
    }

    /// Unlock `edge` if its axis can still grow
    pub fn unlock_edge_if_expandable(&mut self, edge: Edge) -> bool {
        if self.grid.bounds().is_at_max(edge.axis()) {
            return false;
        }
        self.unlock_edge(edge);
        true
    }

    /// Bring every edge lock in line with the current size
    pub fn refresh_edge_locks(&mut self) {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            for edge in axis.edges() {
                self.unlock_edge_if_expandable(edge);
            }
        }
        for edge in Edge::ALL {
            self.lock_edge_axis_if_needed(edge);
        }
    }

    // Serialization

    /// The sub-map's own concurrences, for standalone serialization
    pub fn concurrence_table(&self) -> ConcurrenceTable {
        concurrence_table(self.grid.concurrences())
    }

    /// Serialize; each layer lists its partners from `concurrences`
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
            &TilemapPayload {
                kind: self.kind,
                tile_size: self.grid.tile_size(),
                grid_size: bounds.grid_size,
                min_grid_size: bounds.min_grid_size,
                max_grid_size: bounds.max_grid_size,
                locked_edges: &self.locked_edges,
                layers,
            },
        )
    }

    /// Rebuild layers and locks. Concurrences are restored by the owning map
    /// once every layer of both sub-maps exists.
    pub fn from_tagged(
        payload: &Value,
        registry: &LevelRegistry,
        context: &mut LoadContext,
    ) -> Result<Self, SerializationError> {
        let kind: TilemapKind = parse_field_or_default(payload, "kind")?;
        let tile_size: GridSize = parse_field(payload, "tile_size")?;
        let bounds = parse_bounds(payload)?;

        let mut tilemap = Self::new(kind, tile_size, bounds);
        let layers: Vec<Value> = parse_field(payload, "layers")?;
        for layer in &layers {
            let layer = registry.deserialize_layer(layer, context)?.into_tilemap_layer()?;
            for tile in layer.elements() {
                tilemap.grid.check_in_bounds(tile.position)?;
            }
            tilemap.add_layer(layer)?;
        }
        tilemap.locked_edges = parse_field_or_default(payload, "locked_edges")?;
        Ok(tilemap)
    }
}

/// Read the size fields of a map payload, rejecting sizes outside the limits
pub(crate) fn parse_bounds(payload: &Value) -> Result<GridBounds, SerializationError> {
    let grid_size: GridSize = parse_field(payload, "grid_size")?;
    let min_grid_size: GridSize = parse_field(payload, "min_grid_size")?;
    let max_grid_size: GridSize = parse_field(payload, "max_grid_size")?;
    if !min_grid_size.fits_within(&max_grid_size) {
        return Err(SerializationError::Mismatch(format!(
            "min grid size {min_grid_size} exceeds max grid size {max_grid_size}"
        )));
    }
    let bounds = GridBounds::new(grid_size, min_grid_size, max_grid_size);
    if bounds.grid_size != grid_size {
        return Err(SerializationError::Mismatch(format!(
            "grid size {grid_size} is outside {}..{}",
            bounds.min_grid_size, bounds.max_grid_size
        )));
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::level_registry;
    use delver_map_core::Tileset;
    use std::sync::Arc;

    fn tilemap() -> EditorTilemap {
        let bounds = GridBounds::new(
            GridSize::new(5, 5),
            GridSize::new(5, 5),
            GridSize::new(5, 9),
        );
        let mut tilemap =
            EditorTilemap::new(TilemapKind::WallsAndFloor, GridSize::new(16, 16), bounds);
        let tileset = Arc::new(Tileset::new("/assets/dungeon.png"));
        tilemap
            .add_layer(EditorTilemapLayer::new("floor", tileset.clone(), "/floor.svg"))
            .unwrap();
        tilemap
            .add_layer(EditorTilemapLayer::new("walls", tileset, "/walls.svg"))
            .unwrap();
        tilemap.add_layer_concurrence("walls", "floor").unwrap();
        for position in tilemap.grid().get_edge_positions(None, 0) {
            tilemap.place_tile("walls", position).unwrap();
        }
        tilemap
    }

    #[test]
    fn test_place_tile_skips_occupied_cells() {
        let mut tilemap = tilemap();
        assert!(tilemap.place_tile("walls", Position::new(0, 0)).unwrap().is_none());
        assert!(tilemap.place_tile("walls", Position::new(2, 2)).unwrap().is_some());
    }

    #[test]
    fn test_place_tile_evicts_concurrent_layer() {
        let mut tilemap = tilemap();
        let at = Position::new(0, 2);
        let evicted = tilemap.place_tile("floor", at).unwrap().unwrap();

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].0, "walls");
        assert_eq!(tilemap.get_tile_at("floor", at).unwrap().name, "floor");
        assert!(tilemap.get_tile_at("walls", at).is_none());
    }

    #[test]
    fn test_wall_tiles_are_autotiled() {
        let mut tilemap = tilemap();
        tilemap.format_all_tiles();
        let corner = tilemap.get_tile_at("walls", Position::new(0, 0)).unwrap();
        let side = tilemap.get_tile_at("walls", Position::new(0, 2)).unwrap();
        assert!(corner.is_autotile());
        assert_ne!(corner.variant, side.variant);
    }

    #[test]
    fn test_lock_axis_only_at_max() {
        let mut tilemap = tilemap();
        assert!(tilemap.lock_edge_axis_if_needed(Edge::Left));
        assert!(!tilemap.lock_edge_axis_if_needed(Edge::Top));

        assert!(tilemap.is_edge_locked(Edge::Left));
        assert!(tilemap.is_edge_locked(Edge::Right));
        assert!(!tilemap.is_edge_locked(Edge::Top));
        assert!(tilemap.get_tile_at("walls", Position::new(4, 2)).unwrap().locked);
        assert!(!tilemap.get_tile_at("walls", Position::new(2, 0)).unwrap().locked);
    }

    #[test]
    fn test_unlock_keeps_shared_corners() {
        let mut tilemap = tilemap();
        tilemap.lock_edge(Edge::Left);
        tilemap.lock_edge(Edge::Top);
        tilemap.unlock_edge(Edge::Top);

        assert!(tilemap.get_tile_at("walls", Position::new(0, 0)).unwrap().locked);
        assert!(!tilemap.get_tile_at("walls", Position::new(1, 0)).unwrap().locked);
    }

    #[test]
    fn test_unlock_if_expandable() {
        let mut tilemap = tilemap();
        tilemap.lock_edge(Edge::Left);
        tilemap.lock_edge(Edge::Top);
        assert!(!tilemap.unlock_edge_if_expandable(Edge::Left));
        assert!(tilemap.unlock_edge_if_expandable(Edge::Top));
        assert_eq!(
            tilemap.locked_edges().iter().copied().collect::<Vec<_>>(),
            vec![Edge::Left]
        );
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let paths = AssetPaths::new("/project");
        let mut payload = tilemap().to_tagged(&paths, &ConcurrenceTable::new()).unwrap();
        payload["grid_size"] = serde_json::json!([7, 7]);
        payload["min_grid_size"] = serde_json::json!([7, 7]);
        payload["max_grid_size"] = serde_json::json!([5, 5]);

        let mut context = LoadContext::new(paths);
        let result = EditorTilemap::from_tagged(&payload, level_registry(), &mut context);
        assert!(matches!(result, Err(SerializationError::Mismatch(_))));
    }

    #[test]
    fn test_placed_tile_on_locked_edge_is_locked() {
        let mut tilemap = tilemap();
        tilemap.refresh_edge_locks();
        let at = Position::new(4, 2);
        tilemap.remove_tile_at("walls", at, false).unwrap();
        tilemap.place_tile("walls", at).unwrap();
        assert!(tilemap.get_tile_at("walls", at).unwrap().locked);
    }
}
