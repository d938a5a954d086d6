//! Builds fresh levels from the editor configuration

use delver_map_core::{Position, Tileset};
use std::sync::Arc;
use tracing::info;

use crate::{
    CanvasObjectsFactory, CanvasObjectsManager, EditorConfig, EditorError, EditorResult,
    EditorTilemapLayer, Level, MixedMap, WorldObjectsLayer, DELVER, ESSENTIALS_LAYER,
};

/// Creates new levels: layers, concurrences, starting tiles, edge locks and
/// the starting delver and goal
pub struct LevelFactory<'a> {
    config: &'a EditorConfig,
}

impl<'a> LevelFactory<'a> {
    pub fn new(config: &'a EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        self.config
    }

    pub fn canvas_objects(&self) -> CanvasObjectsManager {
        CanvasObjectsFactory::new(self.config).create_canvas_objects()
    }

    pub fn create_level(&self) -> EditorResult<Level> {
        self.config.validate()?;
        let config = self.config;
        let kind = config.tilemap_kind;

        let mut map = MixedMap::new(kind, config.tile_size, config.bounds());
        self.configure_tilemap(&mut map)?;
        map.add_world_objects_layer(WorldObjectsLayer::new(
            ESSENTIALS_LAYER,
            config.asset("svg/important.svg"),
        ))?;
        map.populate_layers(&config.layer_order);
        map.add_layer_concurrence(kind.primary_layer(), ESSENTIALS_LAYER)?;

        self.create_starting_tiles(&mut map)?;
        map.refresh_edge_locks();

        let mut level = Level::new(map);
        self.create_starting_world_objects(&mut level)?;
        info!(
            "Created level '{}' ({} grid, {:?})",
            level.name(),
            level.map().grid_size(),
            kind
        );
        Ok(level)
    }

    fn configure_tilemap(&self, map: &mut MixedMap) -> EditorResult<()> {
        let config = self.config;
        let tile_layers = config
            .layer_order
            .iter()
            .filter(|name| config.tilemap_layer_names.contains(name));
        for name in tile_layers {
            let tileset = Tileset::new(config.asset(&format!("img/tilesets/dungeon/{name}.png")));
            map.add_tilemap_layer(EditorTilemapLayer::new(
                name.clone(),
                Arc::new(tileset),
                config.asset(&format!("svg/{name}.svg")),
            ))?;
        }

        let kind = config.tilemap_kind;
        if let Some(secondary) = kind.secondary_layer() {
            map.add_layer_concurrence(kind.primary_layer(), secondary)?;
        }
        Ok(())
    }

    /// Secondary tiles inside, primary tiles on the border, then one
    /// formatting pass over everything
    fn create_starting_tiles(&self, map: &mut MixedMap) -> EditorResult<()> {
        let kind = map.kind();
        let size = map.grid_size();
        if let Some(secondary) = kind.secondary_layer() {
            for x in 1..size.width as i32 - 1 {
                for y in 1..size.height as i32 - 1 {
                    map.place_tile(secondary, Position::new(x, y))?;
                }
            }
        }
        for position in map.bounds().edge_positions(None, 0) {
            map.place_tile(kind.primary_layer(), position)?;
        }
        map.tilemap_mut().format_all_tiles();
        Ok(())
    }

    fn create_starting_world_objects(&self, level: &mut Level) -> EditorResult<()> {
        let config = self.config;
        let first_goal = config
            .goal_variations
            .first()
            .ok_or_else(|| EditorError::config("goal_variations cannot be empty"))?;

        let canvas_objects = self.canvas_objects();
        let map = level.map_mut();
        canvas_objects.create_at(map, DELVER, config.start_delver_position)?;
        canvas_objects.create_at(map, first_goal, config.start_goal_position)?;
        Ok(())
    }
}
