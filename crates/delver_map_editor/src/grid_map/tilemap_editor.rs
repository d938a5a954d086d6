//! User-facing tile edits that may resize the owning map

use delver_map_core::{Edge, GridError, Position};
use tracing::debug;

use super::{MixedMap, RemovedOccupant};

/// Tile editing with access back to the owning [`MixedMap`].
///
/// Placing a primary tile one cell inside the border can collapse that
/// border, and opening a boundary cell grows the map towards it. Both need
/// the whole map, so the editor borrows it for the duration of the edit.
pub struct TilemapEditor<'a> {
    map: &'a mut MixedMap,
}

impl<'a> TilemapEditor<'a> {
    pub fn new(map: &'a mut MixedMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &MixedMap {
        self.map
    }

    // Walls and floor

    /// Place a wall. With `apply_formatting`, reformat around it and
    /// collapse any edge it completes.
    pub fn create_basic_wall_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        self.create_primary_at("walls", position, apply_formatting)
    }

    /// Place a floor tile. A floor on the boundary grows the map towards it.
    pub fn create_basic_floor_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let Some(removed) = self.map.place_tile("floor", position)? else {
            return Ok(Vec::new());
        };
        if apply_formatting {
            self.map.tilemap_mut().format_around(position);
        }
        if self.is_on_boundary(position) {
            self.dynamic_expand_grid(position);
        }
        Ok(removed)
    }

    /// Replace the wall at `position` with floor
    pub fn remove_wall_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let mut removed = self.take_tile("walls", position, apply_formatting)?;
        removed.extend(self.create_basic_floor_at(position, apply_formatting)?);
        Ok(removed)
    }

    /// Replace the floor at `position` with a wall
    pub fn remove_floor_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let mut removed = self.take_tile("floor", position, apply_formatting)?;
        removed.extend(self.create_basic_wall_at(position, apply_formatting)?);
        Ok(removed)
    }

    // Platforms

    pub fn create_basic_platform_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        self.create_primary_at("platforms", position, apply_formatting)
    }

    /// Clear the platform at `position`. Nothing replaces it; a cleared
    /// boundary cell grows the map towards it.
    pub fn remove_platform_at(
        &mut self,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let removed = self.take_tile("platforms", position, apply_formatting)?;
        if !removed.is_empty() && self.is_on_boundary(position) {
            self.dynamic_expand_grid(position);
        }
        Ok(removed)
    }

    fn create_primary_at(
        &mut self,
        layer: &str,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let Some(mut removed) = self.map.place_tile(layer, position)? else {
            return Ok(Vec::new());
        };
        if apply_formatting {
            self.map.tilemap_mut().format_around(position);
            removed.extend(self.reduce_towards_if_needed(position));
        }
        Ok(removed)
    }

    fn take_tile(
        &mut self,
        layer: &str,
        position: Position,
        apply_formatting: bool,
    ) -> Result<Vec<RemovedOccupant>, GridError> {
        let tile = self
            .map
            .tilemap_mut()
            .remove_tile_at(layer, position, apply_formatting)?;
        Ok(tile
            .into_iter()
            .map(|tile| RemovedOccupant {
                layer: layer.to_string(),
                element: tile.into(),
            })
            .collect())
    }

    fn is_on_boundary(&self, position: Position) -> bool {
        !self.map.bounds().edges_of(position).is_empty()
    }

    // Dynamic resizing

    /// Collapse every edge the primary tile at `position` completes.
    ///
    /// A tile one cell inside an edge completes it when the whole line one
    /// cell inside is primary. The check repeats on the same edge after each
    /// collapse until the line is broken or the map is at its minimum.
    pub fn reduce_towards_if_needed(&mut self, position: Position) -> Vec<RemovedOccupant> {
        let size = self.map.grid_size();
        let (width, height) = (size.width as i32, size.height as i32);
        let mut edges = Vec::new();
        if position.x == 1 {
            edges.push(Edge::Left);
        }
        if position.x == width - 2 {
            edges.push(Edge::Right);
        }
        if position.y == 1 {
            edges.push(Edge::Top);
        }
        if position.y == height - 2 {
            edges.push(Edge::Bottom);
        }

        let mut removed = Vec::new();
        for edge in edges {
            self.collapse_edge(edge, 0, &mut removed);
        }
        removed
    }

    fn collapse_edge(&mut self, edge: Edge, depth: u32, removed: &mut Vec<RemovedOccupant>) {
        if !self.is_line_primary(edge, 1) {
            return;
        }
        let collapsed = self.map.reduce_towards(edge, 1);
        if collapsed.is_empty() {
            return;
        }
        if depth == 0 {
            self.map.unlock_edge_if_expandable(edge);
            self.map.unlock_edge_if_expandable(edge.opposite());
        }
        debug!(
            "collapsed {edge} edge (depth {depth}), grid is now {}",
            self.map.grid_size()
        );
        removed.extend(collapsed);
        self.collapse_edge(edge, depth + 1, removed);
    }

    fn is_line_primary(&self, edge: Edge, retreat: u32) -> bool {
        let kind = self.map.kind();
        let Ok(layer) = self.map.get_tilemap_layer(kind.primary_layer()) else {
            return false;
        };
        let line = layer.get_edge_tiles(self.map.bounds(), edge, retreat);
        !line.is_empty()
            && line
                .iter()
                .all(|tile| matches!(tile, Some(tile) if tile.name == kind.primary_tile()))
    }

    /// Grow towards every edge `position` lies on, relocking any axis that
    /// reaches its maximum. Returns the edges that grew.
    pub fn dynamic_expand_grid(&mut self, position: Position) -> Vec<Edge> {
        let edges = self.map.bounds().edges_of(position);
        let mut grown = Vec::new();
        for edge in edges {
            if !self.map.expand_towards(edge, 1).is_empty() {
                grown.push(edge);
            }
            self.map.lock_edge_axis_if_needed(edge);
        }
        grown
    }

    pub fn lock_edge(&mut self, edge: Edge) {
        self.map.lock_edge(edge);
    }

    pub fn unlock_edge(&mut self, edge: Edge) {
        self.map.unlock_edge(edge);
    }
}
