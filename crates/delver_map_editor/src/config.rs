//! Editor configuration loaded once at startup
//!
//! The configuration is a TOML file deserialized into [`EditorConfig`] and
//! passed by reference into factories. Core logic never reads ambient state.

use delver_map_core::{GridBounds, GridSize, Position};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{AssetPaths, EditorError, EditorResult};

/// Name of the world-object layer holding the delver and the goal
pub const ESSENTIALS_LAYER: &str = "essentials";
pub const DELVER: &str = "delver";
pub const GOAL: &str = "goal";

/// Which tile layers a level is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TilemapKind {
    /// A wall layer over a floor layer, walls around the border
    #[default]
    WallsAndFloor,
    /// A single platform layer
    Platforms,
}

impl TilemapKind {
    /// Layer holding the tile that borders the map
    pub const fn primary_layer(self) -> &'static str {
        match self {
            TilemapKind::WallsAndFloor => "walls",
            TilemapKind::Platforms => "platforms",
        }
    }

    pub const fn primary_tile(self) -> &'static str {
        match self {
            TilemapKind::WallsAndFloor => "wall",
            TilemapKind::Platforms => "platform",
        }
    }

    /// Layer whose tile replaces a removed primary tile, if any
    pub const fn secondary_layer(self) -> Option<&'static str> {
        match self {
            TilemapKind::WallsAndFloor => Some("floor"),
            TilemapKind::Platforms => None,
        }
    }

    pub const fn secondary_tile(self) -> Option<&'static str> {
        match self {
            TilemapKind::WallsAndFloor => Some("floor"),
            TilemapKind::Platforms => None,
        }
    }

    pub fn layer_names(self) -> Vec<&'static str> {
        let mut names = vec![self.primary_layer()];
        names.extend(self.secondary_layer());
        names
    }

    /// Tile type placed on `layer`, if the layer belongs to this kind
    pub fn tile_for_layer(self, layer: &str) -> Option<&'static str> {
        if layer == self.primary_layer() {
            Some(self.primary_tile())
        } else if Some(layer) == self.secondary_layer() {
            self.secondary_tile()
        } else {
            None
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tile size in pixels
    pub tile_size: GridSize,
    pub start_grid_size: GridSize,
    pub min_grid_size: GridSize,
    pub max_grid_size: GridSize,
    /// Draw order of every layer, bottom first
    pub layer_order: Vec<String>,
    /// Entries of `layer_order` that are tile layers
    pub tilemap_layer_names: Vec<String>,
    pub tilemap_kind: TilemapKind,
    pub start_delver_position: Position,
    pub start_goal_position: Position,
    /// Goal variants; the first is placed on new levels
    pub goal_variations: Vec<String>,
    /// Levels are saved under `<level_save_folder>/<name>/level.json`
    pub level_save_folder: PathBuf,
    /// Root that saved asset paths are made relative to
    pub project_root: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tile_size: GridSize::new(32, 32),
            start_grid_size: GridSize::new(9, 7),
            min_grid_size: GridSize::new(5, 5),
            max_grid_size: GridSize::new(30, 20),
            layer_order: vec![
                "floor".to_string(),
                "walls".to_string(),
                ESSENTIALS_LAYER.to_string(),
            ],
            tilemap_layer_names: vec!["floor".to_string(), "walls".to_string()],
            tilemap_kind: TilemapKind::WallsAndFloor,
            start_delver_position: Position::new(2, 3),
            start_goal_position: Position::new(6, 3),
            goal_variations: vec![
                "battery_snack".to_string(),
                "oil_drink".to_string(),
                "uranium_cake".to_string(),
            ],
            level_save_folder: PathBuf::from("levels"),
            project_root: PathBuf::from("."),
        }
    }
}

impl EditorConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EditorError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration string
    pub fn from_toml_str(content: &str) -> EditorResult<Self> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check sizes, layer names and starting positions for consistency
    pub fn validate(&self) -> EditorResult<()> {
        if self.min_grid_size.width < 3 || self.min_grid_size.height < 3 {
            return Err(EditorError::config(format!(
                "min_grid_size {} leaves no room inside the border",
                self.min_grid_size
            )));
        }
        if !self.min_grid_size.fits_within(&self.start_grid_size)
            || !self.start_grid_size.fits_within(&self.max_grid_size)
        {
            return Err(EditorError::config(format!(
                "start_grid_size {} must lie between {} and {}",
                self.start_grid_size, self.min_grid_size, self.max_grid_size
            )));
        }

        for layer in self.tilemap_kind.layer_names() {
            if !self.tilemap_layer_names.iter().any(|name| name == layer) {
                return Err(EditorError::config(format!(
                    "tilemap_layer_names is missing '{layer}'"
                )));
            }
        }
        for layer in self
            .tilemap_layer_names
            .iter()
            .map(String::as_str)
            .chain([ESSENTIALS_LAYER])
        {
            if !self.layer_order.iter().any(|name| name == layer) {
                return Err(EditorError::config(format!(
                    "layer_order is missing '{layer}'"
                )));
            }
        }

        for (label, position) in [
            ("start_delver_position", self.start_delver_position),
            ("start_goal_position", self.start_goal_position),
        ] {
            if !self.is_inside_border(position) {
                return Err(EditorError::config(format!(
                    "{label} {position} must lie inside the border of the {} start grid",
                    self.start_grid_size
                )));
            }
        }
        if self.start_delver_position == self.start_goal_position {
            return Err(EditorError::config(
                "the delver and the goal cannot start on the same cell",
            ));
        }
        if self.goal_variations.is_empty() {
            return Err(EditorError::config("goal_variations cannot be empty"));
        }
        Ok(())
    }

    fn is_inside_border(&self, position: Position) -> bool {
        let GridSize { width, height } = self.start_grid_size;
        position.x >= 1
            && position.y >= 1
            && position.x < width as i32 - 1
            && position.y < height as i32 - 1
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.start_grid_size, self.min_grid_size, self.max_grid_size)
    }

    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths::new(&self.project_root)
    }

    /// Absolute path of a file under `<project_root>/assets`
    pub fn asset(&self, relative: &str) -> PathBuf {
        self.project_root.join("assets").join(relative)
    }
}
