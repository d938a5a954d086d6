//! Named layers mapping positions to elements

use delver_map_autotile::{Neighborhood, VariantTable};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Edge, GridBounds, GridElement, Position, SerializationError, Tile};

/// A named layer holding at most one element per position
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayer<E> {
    name: String,
    elements: BTreeMap<Position, E>,
}

impl<E: GridElement> GridLayer<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements, ordered by position
    pub fn elements(&self) -> impl Iterator<Item = &E> {
        self.elements.values()
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.elements.values_mut()
    }

    pub fn get_element_at(&self, position: Position) -> Option<&E> {
        self.elements.get(&position)
    }

    pub fn get_element_at_mut(&mut self, position: Position) -> Option<&mut E> {
        self.elements.get_mut(&position)
    }

    pub fn has_element_at(&self, position: Position) -> bool {
        self.elements.contains_key(&position)
    }

    /// Insert an element at its own position, returning the one it replaced
    pub fn add_element(&mut self, element: E) -> Option<E> {
        self.elements.insert(element.position(), element)
    }

    pub fn remove_element_at(&mut self, position: Position) -> Option<E> {
        self.elements.remove(&position)
    }

    /// Elements whose name is one of `names`
    pub fn get_elements_named(&self, names: &[&str]) -> Vec<&E> {
        self.elements
            .values()
            .filter(|element| names.contains(&element.name()))
            .collect()
    }

    pub fn has_element_named(&self, name: &str) -> bool {
        self.elements.values().any(|element| element.name() == name)
    }

    /// Remove every element matching `predicate`
    pub fn remove_elements_where<F>(&mut self, mut predicate: F) -> Vec<E>
    where
        F: FnMut(&E) -> bool,
    {
        let positions: Vec<Position> = self
            .elements
            .values()
            .filter(|element| predicate(element))
            .map(GridElement::position)
            .collect();
        positions
            .into_iter()
            .filter_map(|position| self.elements.remove(&position))
            .collect()
    }

    /// Occupants along one boundary; empty cells are `None`
    pub fn get_edge_elements(&self, bounds: &GridBounds, edge: Edge) -> Vec<Option<&E>> {
        self.elements_at(&bounds.edge_positions(Some(edge), 0))
    }

    pub fn elements_at(&self, positions: &[Position]) -> Vec<Option<&E>> {
        positions
            .iter()
            .map(|position| self.elements.get(position))
            .collect()
    }

    /// Set or clear the lock flag on whatever occupies `positions`
    pub fn set_locked_at(&mut self, positions: &[Position], locked: bool) {
        for position in positions {
            if let Some(element) = self.elements.get_mut(position) {
                element.set_locked(locked);
            }
        }
    }

    /// Move every element by `(dx, dy)`
    pub fn shift(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let elements = std::mem::take(&mut self.elements);
        self.elements = elements
            .into_values()
            .map(|mut element| {
                let position = element.position().offset(dx, dy);
                element.set_position(position);
                (position, element)
            })
            .collect();
    }

    /// Tagged payloads for every element, in position order
    pub fn elements_to_tagged(&self) -> Result<Vec<Value>, SerializationError> {
        self.elements.values().map(GridElement::to_tagged).collect()
    }
}

impl GridLayer<Tile> {
    pub fn get_tile_at(&self, position: Position) -> Option<&Tile> {
        self.get_element_at(position)
    }

    /// Create a plain tile if the cell is free
    pub fn create_tile_at(&mut self, position: Position, name: &str) -> Option<&Tile> {
        self.insert_if_free(Tile::new(position, name))
    }

    /// Create an autotiled tile if the cell is free
    pub fn create_autotile_tile_at(
        &mut self,
        position: Position,
        name: &str,
        table: VariantTable,
    ) -> Option<&Tile> {
        self.insert_if_free(Tile::autotiled(position, name, table))
    }

    fn insert_if_free(&mut self, tile: Tile) -> Option<&Tile> {
        let position = tile.position;
        if self.elements.contains_key(&position) {
            return None;
        }
        self.elements.insert(position, tile);
        self.elements.get(&position)
    }

    /// Remove a tile, reformatting the cells around it when asked
    pub fn remove_tile_at(&mut self, position: Position, apply_formatting: bool) -> Option<Tile> {
        let removed = self.elements.remove(&position)?;
        if apply_formatting {
            self.format_around(position);
        }
        Some(removed)
    }

    /// Tiles of the row/column `retreat` cells inside `edge`
    pub fn get_edge_tiles(&self, bounds: &GridBounds, edge: Edge, retreat: u32) -> Vec<Option<&Tile>> {
        self.elements_at(&bounds.edge_positions(Some(edge), retreat))
    }

    /// Reformat the tile at `position` against its same-type neighbors
    pub fn format_at(&mut self, position: Position) {
        let Some(name) = self.elements.get(&position).map(|tile| tile.name.clone()) else {
            return;
        };
        let elements = &self.elements;
        let neighborhood = Neighborhood::scan(position.x, position.y, |x, y| {
            elements
                .get(&Position::new(x, y))
                .is_some_and(|tile| tile.name == name)
        });
        if let Some(tile) = self.elements.get_mut(&position) {
            tile.format(&neighborhood);
        }
    }

    /// Reformat the tile at `position` and the 8 cells around it
    pub fn format_around(&mut self, position: Position) {
        for cell in position.with_neighbors() {
            self.format_at(cell);
        }
    }

    pub fn format_all(&mut self) {
        let positions: Vec<Position> = self.elements.keys().copied().collect();
        for position in positions {
            self.format_at(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSize;

    fn bounds() -> GridBounds {
        GridBounds::new(
            GridSize::new(4, 4),
            GridSize::new(2, 2),
            GridSize::new(8, 8),
        )
    }

    #[test]
    fn test_create_tile_only_on_free_cell() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        assert!(layer.create_tile_at(Position::new(1, 1), "wall").is_some());
        assert!(layer.create_tile_at(Position::new(1, 1), "wall").is_none());
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_edge_elements_are_nullable() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        layer.create_tile_at(Position::new(0, 0), "wall");
        layer.create_tile_at(Position::new(0, 2), "wall");

        let edge = layer.get_edge_elements(&bounds(), Edge::Left);
        assert_eq!(edge.len(), 4);
        assert!(edge[0].is_some());
        assert!(edge[1].is_none());
        assert!(edge[2].is_some());
        assert!(edge[3].is_none());
    }

    #[test]
    fn test_shift_moves_keys_and_positions() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        layer.create_tile_at(Position::new(0, 1), "wall");
        layer.shift(2, 0);

        let tile = layer.get_tile_at(Position::new(2, 1)).unwrap();
        assert_eq!(tile.position, Position::new(2, 1));
        assert!(!layer.has_element_at(Position::new(0, 1)));
    }

    #[test]
    fn test_format_sees_neighbors() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        let table = VariantTable::blob(0);
        for x in 0..3 {
            layer.create_autotile_tile_at(Position::new(x, 0), "wall", table);
        }
        layer.format_all();

        let middle = layer.get_tile_at(Position::new(1, 0)).unwrap();
        let left = layer.get_tile_at(Position::new(0, 0)).unwrap();
        assert_ne!(middle.variant, left.variant);
        assert!(middle.is_shallow());
    }

    #[test]
    fn test_remove_tile_reformats_neighbors() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        let table = VariantTable::blob(0);
        layer.create_autotile_tile_at(Position::new(0, 0), "wall", table);
        layer.create_autotile_tile_at(Position::new(1, 0), "wall", table);
        layer.format_all();
        let joined = layer.get_tile_at(Position::new(0, 0)).unwrap().variant;

        layer.remove_tile_at(Position::new(1, 0), true);
        let alone = layer.get_tile_at(Position::new(0, 0)).unwrap().variant;
        assert_ne!(joined, alone);
        assert_eq!(alone, 0);
    }

    #[test]
    fn test_named_lookup_and_removal() {
        let mut layer: GridLayer<Tile> = GridLayer::new("mixed");
        layer.create_tile_at(Position::new(0, 0), "wall");
        layer.create_tile_at(Position::new(1, 0), "floor");
        layer.create_tile_at(Position::new(2, 0), "floor");

        assert_eq!(layer.get_elements_named(&["floor"]).len(), 2);
        assert!(layer.has_element_named("wall"));

        let removed = layer.remove_elements_where(|tile| tile.name == "floor");
        assert_eq!(removed.len(), 2);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_set_locked_at() {
        let mut layer: GridLayer<Tile> = GridLayer::new("walls");
        layer.create_tile_at(Position::new(0, 0), "wall");
        layer.set_locked_at(&[Position::new(0, 0), Position::new(5, 5)], true);
        assert!(layer.get_tile_at(Position::new(0, 0)).unwrap().locked);
    }
}
