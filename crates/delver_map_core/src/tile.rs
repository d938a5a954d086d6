//! Tiles, optionally autotiled against same-type neighbors

use delver_map_autotile::{Neighborhood, VariantTable};
use serde::{Deserialize, Serialize};

use crate::{GridElement, Position};

/// A tile placed on a tile layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub position: Position,
    /// Type name, e.g. "wall", "floor" or "platform"
    pub name: String,
    /// Index into the layer's tileset
    #[serde(default)]
    pub variant: u32,
    /// Autotile rules; plain tiles keep their variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autotile: Option<VariantTable>,
    /// Set by the last format: nothing of the same type directly below
    #[serde(default)]
    pub shallow: bool,
    /// Boundary tiles the editor must not remove
    #[serde(default)]
    pub locked: bool,
}

impl Tile {
    /// Create a plain tile
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            variant: 0,
            autotile: None,
            shallow: false,
            locked: false,
        }
    }

    /// Create a tile that picks its variant from its neighbors
    pub fn autotiled(position: Position, name: impl Into<String>, table: VariantTable) -> Self {
        Self {
            autotile: Some(table),
            ..Self::new(position, name)
        }
    }

    pub fn is_autotile(&self) -> bool {
        self.autotile.is_some()
    }

    pub fn is_shallow(&self) -> bool {
        self.shallow
    }

    /// Recompute the visual variant from the current neighbors
    pub fn format(&mut self, neighborhood: &Neighborhood) {
        self.shallow = neighborhood.shallow;
        if let Some(table) = &self.autotile {
            self.variant = table.variant(neighborhood);
        }
    }
}

impl GridElement for Tile {
    const CLASS: &'static str = "Tile";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}
