//! Bounded, resizable stacks of layers

use tracing::debug;

use crate::{
    Axis, Edge, GridBounds, GridElement, GridError, GridLayer, GridSize, Position,
};

/// A layer type a `GridMap` can hold.
///
/// Editor layers wrap a `GridLayer` with extra metadata (tilesets, icons);
/// the map only needs access to the positions and elements.
pub trait MapLayer {
    type Element: GridElement;

    fn grid_layer(&self) -> &GridLayer<Self::Element>;

    fn grid_layer_mut(&mut self) -> &mut GridLayer<Self::Element>;

    fn name(&self) -> &str {
        self.grid_layer().name()
    }
}

impl<E: GridElement> MapLayer for GridLayer<E> {
    type Element = E;

    fn grid_layer(&self) -> &GridLayer<E> {
        self
    }

    fn grid_layer_mut(&mut self) -> &mut GridLayer<E> {
        self
    }
}

/// Ordered layers sharing one grid size and one set of bounds
#[derive(Debug, Clone)]
pub struct GridMap<L> {
    tile_size: GridSize,
    bounds: GridBounds,
    layers: Vec<L>,
    /// Unordered pairs of mutually exclusive layer names
    concurrences: Vec<(String, String)>,
}

impl<L: MapLayer> GridMap<L> {
    pub fn new(tile_size: GridSize, bounds: GridBounds) -> Self {
        Self {
            tile_size,
            bounds,
            layers: Vec::new(),
            concurrences: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> GridSize {
        self.tile_size
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn grid_size(&self) -> GridSize {
        self.bounds.grid_size
    }

    pub fn min_grid_size(&self) -> GridSize {
        self.bounds.min_grid_size
    }

    pub fn max_grid_size(&self) -> GridSize {
        self.bounds.max_grid_size
    }

    pub fn clamp_size(&self, size: GridSize) -> GridSize {
        self.bounds.clamp_size(size)
    }

    // Layers

    /// Append a layer; names must be unique within the map
    pub fn add_layer(&mut self, layer: L) -> Result<(), GridError> {
        if self.has_layer(layer.name()) {
            return Err(GridError::DuplicateLayer(layer.name().to_string()));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.name() == name)
    }

    pub fn get_layer(&self, name: &str) -> Result<&L, GridError> {
        self.layers
            .iter()
            .find(|layer| layer.name() == name)
            .ok_or_else(|| GridError::LayerNotFound(name.to_string()))
    }

    pub fn get_layer_mut(&mut self, name: &str) -> Result<&mut L, GridError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.name() == name)
            .ok_or_else(|| GridError::LayerNotFound(name.to_string()))
    }

    pub fn layers(&self) -> &[L] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [L] {
        &mut self.layers
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(MapLayer::name).collect()
    }

    // Concurrences

    /// Declare two layers mutually exclusive. Declaring a pair twice is a no-op.
    pub fn add_layer_concurrence(&mut self, a: &str, b: &str) -> Result<(), GridError> {
        self.get_layer(a)?;
        self.get_layer(b)?;
        if !self.are_concurrent(a, b) {
            self.concurrences.push((a.to_string(), b.to_string()));
        }
        Ok(())
    }

    pub fn are_concurrent(&self, a: &str, b: &str) -> bool {
        self.concurrences
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Names of the layers declared exclusive with `name`
    pub fn concurrent_layers(&self, name: &str) -> Vec<&str> {
        self.concurrences
            .iter()
            .filter_map(|(a, b)| {
                if a == name {
                    Some(b.as_str())
                } else if b == name {
                    Some(a.as_str())
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn concurrences(&self) -> &[(String, String)] {
        &self.concurrences
    }

    // Elements

    /// Add an element to a layer.
    ///
    /// Occupants of concurrent layers at the same position are evicted and
    /// returned along with their layer names, as is an element replaced on
    /// the target layer itself.
    pub fn add_element(
        &mut self,
        layer_name: &str,
        element: L::Element,
    ) -> Result<Vec<(String, L::Element)>, GridError> {
        let position = element.position();
        self.check_in_bounds(position)?;
        self.get_layer(layer_name)?;

        let mut evicted = self.evict_concurrent(layer_name, position);
        if let Some(replaced) = self
            .get_layer_mut(layer_name)?
            .grid_layer_mut()
            .add_element(element)
        {
            evicted.push((layer_name.to_string(), replaced));
        }
        Ok(evicted)
    }

    /// Remove occupants at `position` from every layer concurrent with `layer_name`
    pub fn evict_concurrent(
        &mut self,
        layer_name: &str,
        position: Position,
    ) -> Vec<(String, L::Element)> {
        let partners: Vec<String> = self
            .concurrent_layers(layer_name)
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut evicted = Vec::new();
        for partner in partners {
            if let Ok(layer) = self.get_layer_mut(&partner) {
                if let Some(element) = layer.grid_layer_mut().remove_element_at(position) {
                    evicted.push((partner, element));
                }
            }
        }
        evicted
    }

    pub fn remove_element_at(
        &mut self,
        layer_name: &str,
        position: Position,
    ) -> Result<Option<L::Element>, GridError> {
        Ok(self
            .get_layer_mut(layer_name)?
            .grid_layer_mut()
            .remove_element_at(position))
    }

    /// Every element of every layer, layer by layer
    pub fn all_elements(&self) -> impl Iterator<Item = &L::Element> {
        self.layers
            .iter()
            .flat_map(|layer| layer.grid_layer().elements())
    }

    pub fn check_in_bounds(&self, position: Position) -> Result<(), GridError> {
        if self.bounds.contains(position) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                position,
                width: self.bounds.grid_size.width,
                height: self.bounds.grid_size.height,
            })
        }
    }

    // Geometry

    pub fn get_edge_positions(&self, edge: Option<Edge>, retreat: u32) -> Vec<Position> {
        self.bounds.edge_positions(edge, retreat)
    }

    /// Set or clear the lock flag of every occupant along `edge`
    pub fn set_edge_locked(&mut self, edge: Edge, locked: bool) {
        let positions = self.bounds.edge_positions(Some(edge), 0);
        self.set_locked_at(&positions, locked);
    }

    /// Set or clear the lock flag of whatever occupies `positions`, on every layer
    pub fn set_locked_at(&mut self, positions: &[Position], locked: bool) {
        for layer in &mut self.layers {
            layer.grid_layer_mut().set_locked_at(positions, locked);
        }
    }

    /// Clear the lock flag on every occupant
    pub fn clear_locks(&mut self) {
        for layer in &mut self.layers {
            for element in layer.grid_layer_mut().elements_mut() {
                element.set_locked(false);
            }
        }
    }

    // Resizing

    /// Grow by up to `size` cells towards `direction`.
    ///
    /// Growing left or top shifts every element so coordinates stay
    /// 0-indexed. Returns the positions of the new, empty cells.
    pub fn expand_towards(&mut self, direction: Edge, size: u32) -> Vec<Position> {
        let axis = direction.axis();
        let amount = size.min(self.bounds.expandable_by(axis));
        if amount == 0 {
            return Vec::new();
        }

        if direction.is_leading() {
            self.shift_all(direction, amount as i32);
        }
        let current = self.bounds.grid_size.along(axis);
        self.bounds.grid_size = self.bounds.grid_size.with_along(axis, current + amount);
        debug!(
            "expanded {} by {} to {}",
            direction, amount, self.bounds.grid_size
        );

        let mut positions = self.bounds.strip_positions(direction, amount);
        positions.sort();
        positions
    }

    /// Shrink by up to `size` cells towards `direction`.
    ///
    /// Returns the removed elements with the name of the layer they were on.
    pub fn reduce_towards(&mut self, direction: Edge, size: u32) -> Vec<(String, L::Element)> {
        let axis = direction.axis();
        let amount = size.min(self.bounds.reducible_by(axis));
        if amount == 0 {
            return Vec::new();
        }

        let strip = self.bounds.strip_positions(direction, amount);
        let mut removed = Vec::new();
        for layer in &mut self.layers {
            let name = layer.name().to_string();
            let grid_layer = layer.grid_layer_mut();
            for position in &strip {
                if let Some(element) = grid_layer.remove_element_at(*position) {
                    removed.push((name.clone(), element));
                }
            }
        }

        if direction.is_leading() {
            self.shift_all(direction, -(amount as i32));
        }
        let current = self.bounds.grid_size.along(axis);
        self.bounds.grid_size = self.bounds.grid_size.with_along(axis, current - amount);
        debug!(
            "reduced {} by {} to {}, removed {} elements",
            direction,
            amount,
            self.bounds.grid_size,
            removed.len()
        );

        removed
    }

    fn shift_all(&mut self, direction: Edge, delta: i32) {
        let (dx, dy) = match direction.axis() {
            Axis::Horizontal => (delta, 0),
            Axis::Vertical => (0, delta),
        };
        for layer in &mut self.layers {
            layer.grid_layer_mut().shift(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    fn map(w: u32, h: u32) -> GridMap<GridLayer<Tile>> {
        let bounds = GridBounds::new(
            GridSize::new(w, h),
            GridSize::new(3, 3),
            GridSize::new(8, 8),
        );
        let mut map = GridMap::new(GridSize::new(16, 16), bounds);
        map.add_layer(GridLayer::new("walls")).unwrap();
        map.add_layer(GridLayer::new("floor")).unwrap();
        map
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut map = map(5, 5);
        assert_eq!(
            map.add_layer(GridLayer::new("walls")),
            Err(GridError::DuplicateLayer("walls".to_string()))
        );
    }

    #[test]
    fn test_missing_layer_is_lookup_failure() {
        let map = map(5, 5);
        assert!(matches!(
            map.get_layer("lava"),
            Err(GridError::LayerNotFound(name)) if name == "lava"
        ));
    }

    #[test]
    fn test_concurrence_evicts_partner() {
        let mut map = map(5, 5);
        map.add_layer_concurrence("walls", "floor").unwrap();
        map.add_layer_concurrence("floor", "walls").unwrap();
        assert_eq!(map.concurrences().len(), 1);

        let at = Position::new(2, 2);
        map.add_element("floor", Tile::new(at, "floor")).unwrap();
        let evicted = map.add_element("walls", Tile::new(at, "wall")).unwrap();

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].0, "floor");
        assert!(!map.get_layer("floor").unwrap().has_element_at(at));
        assert!(map.get_layer("walls").unwrap().has_element_at(at));
    }

    #[test]
    fn test_add_element_out_of_bounds() {
        let mut map = map(5, 5);
        let result = map.add_element("walls", Tile::new(Position::new(5, 0), "wall"));
        assert!(matches!(result, Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn test_expand_right_returns_new_column() {
        let mut map = map(5, 5);
        let added = map.expand_towards(Edge::Right, 1);
        assert_eq!(map.grid_size(), GridSize::new(6, 5));
        assert_eq!(added.len(), 5);
        assert!(added.iter().all(|p| p.x == 5));
    }

    #[test]
    fn test_expand_left_shifts_elements() {
        let mut map = map(5, 5);
        map.add_element("walls", Tile::new(Position::new(0, 0), "wall"))
            .unwrap();

        let added = map.expand_towards(Edge::Left, 2);
        assert_eq!(added.len(), 10);
        assert!(added.iter().all(|p| p.x < 2));
        let walls = map.get_layer("walls").unwrap();
        assert!(walls.has_element_at(Position::new(2, 0)));
        assert_eq!(
            walls.get_tile_at(Position::new(2, 0)).unwrap().position,
            Position::new(2, 0)
        );
    }

    #[test]
    fn test_expand_clamps_to_max() {
        let mut map = map(7, 5);
        assert_eq!(map.expand_towards(Edge::Right, 3).len(), 5);
        assert_eq!(map.grid_size(), GridSize::new(8, 5));
        assert!(map.expand_towards(Edge::Right, 1).is_empty());
    }

    #[test]
    fn test_reduce_top_removes_and_shifts() {
        let mut map = map(5, 5);
        map.add_element("walls", Tile::new(Position::new(1, 0), "wall"))
            .unwrap();
        map.add_element("floor", Tile::new(Position::new(1, 2), "floor"))
            .unwrap();

        let removed = map.reduce_towards(Edge::Top, 1);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, "walls");
        assert_eq!(map.grid_size(), GridSize::new(5, 4));
        assert!(map
            .get_layer("floor")
            .unwrap()
            .has_element_at(Position::new(1, 1)));
    }

    #[test]
    fn test_reduce_clamps_to_min() {
        let mut map = map(4, 4);
        map.reduce_towards(Edge::Bottom, 5);
        assert_eq!(map.grid_size(), GridSize::new(4, 3));
        assert!(map.reduce_towards(Edge::Bottom, 1).is_empty());
    }

    #[test]
    fn test_edge_locking() {
        let mut map = map(5, 5);
        for y in 0..5 {
            map.add_element("walls", Tile::new(Position::new(4, y), "wall"))
                .unwrap();
        }
        map.set_edge_locked(Edge::Right, true);
        assert!(map.all_elements().all(|tile| tile.locked));

        map.clear_locks();
        assert!(map.all_elements().all(|tile| !tile.locked));
    }
}
