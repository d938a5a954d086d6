//! Canvas objects: the named brushes a user places on a level

use delver_map_core::{GridError, Position};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::world_object::variation_tag;
use crate::{
    EditorConfig, EditorError, EditorResult, MixedMap, RemovedOccupant, TilemapKind,
    WorldObjectRepresentation, DELVER, ESSENTIALS_LAYER, GOAL,
};

/// What placing a canvas object does to the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementAction {
    /// Create the basic tile of a tile layer
    Tile { layer: String },
    /// Create a world object named after the canvas object
    Entity { layer: String },
    /// Create `object_name` tagged with this variant, replacing the other variants
    Variation {
        object_name: String,
        layer: String,
        variations: Vec<String>,
    },
}

/// A placeable brush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasObject {
    pub name: String,
    pub image_path: PathBuf,
    /// At most one object of this name on its layer
    pub unique: bool,
    pub action: PlacementAction,
}

impl CanvasObject {
    pub fn new(
        name: impl Into<String>,
        image_path: impl Into<PathBuf>,
        action: PlacementAction,
    ) -> Self {
        Self {
            name: name.into(),
            image_path: image_path.into(),
            unique: false,
            action,
        }
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn layer(&self) -> &str {
        match &self.action {
            PlacementAction::Tile { layer }
            | PlacementAction::Entity { layer }
            | PlacementAction::Variation { layer, .. } => layer,
        }
    }

    /// Only tile brushes can erase
    pub fn can_remove(&self) -> bool {
        matches!(self.action, PlacementAction::Tile { .. })
    }

    /// Place this object at `position`. Returns every occupant the placement
    /// displaced, including the ones cleared for uniqueness.
    pub fn create_at(
        &self,
        map: &mut MixedMap,
        position: Position,
    ) -> EditorResult<Vec<RemovedOccupant>> {
        match &self.action {
            PlacementAction::Tile { layer } => {
                let mut editor = map.tilemap_editor();
                let removed = match layer.as_str() {
                    "walls" => editor.create_basic_wall_at(position, true)?,
                    "floor" => editor.create_basic_floor_at(position, true)?,
                    "platforms" => editor.create_basic_platform_at(position, true)?,
                    other => return Err(GridError::LayerNotFound(other.to_string()).into()),
                };
                Ok(removed)
            }
            PlacementAction::Entity { layer } => {
                let mut removed = Vec::new();
                if self.unique {
                    let name = &self.name;
                    removed.extend(cleared(
                        layer,
                        map.remove_world_objects_where(layer, |object| &object.name == name)?,
                    ));
                }
                removed.extend(map.create_world_object_at(
                    layer,
                    position,
                    &self.name,
                    Vec::new(),
                    self.unique,
                )?);
                Ok(removed)
            }
            PlacementAction::Variation {
                object_name,
                layer,
                variations,
            } => {
                let unique = self.unique;
                let conflicts = |object: &WorldObjectRepresentation| {
                    (unique && &object.name == object_name)
                        || variations.iter().any(|variant| {
                            variant != &self.name && object.canvas_object_name() == variant.as_str()
                        })
                };
                let mut removed: Vec<RemovedOccupant> =
                    cleared(layer, map.remove_world_objects_where(layer, conflicts)?).collect();
                removed.extend(map.create_world_object_at(
                    layer,
                    position,
                    object_name,
                    vec![variation_tag(&self.name)],
                    unique,
                )?);
                Ok(removed)
            }
        }
    }

    /// Erase with this brush. `None` when it cannot erase.
    pub fn remove_at(
        &self,
        map: &mut MixedMap,
        position: Position,
    ) -> EditorResult<Option<Vec<RemovedOccupant>>> {
        let PlacementAction::Tile { layer } = &self.action else {
            return Ok(None);
        };
        let mut editor = map.tilemap_editor();
        let removed = match layer.as_str() {
            "walls" => editor.remove_wall_at(position, true)?,
            "floor" => editor.remove_floor_at(position, true)?,
            "platforms" => editor.remove_platform_at(position, true)?,
            other => return Err(GridError::LayerNotFound(other.to_string()).into()),
        };
        Ok(Some(removed))
    }
}

fn cleared(
    layer: &str,
    objects: Vec<WorldObjectRepresentation>,
) -> impl Iterator<Item = RemovedOccupant> + '_ {
    objects.into_iter().map(move |object| RemovedOccupant {
        layer: layer.to_string(),
        element: object.into(),
    })
}

/// Canvas objects by name
#[derive(Debug, Clone, Default)]
pub struct CanvasObjectsManager {
    objects: BTreeMap<String, CanvasObject>,
}

impl CanvasObjectsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object`, replacing any object of the same name
    pub fn add(&mut self, object: CanvasObject) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn get(&self, name: &str) -> EditorResult<&CanvasObject> {
        self.objects
            .get(name)
            .ok_or_else(|| EditorError::UnknownCanvasObject(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Canvas objects placing on `layer`
    pub fn on_layer<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a CanvasObject> + 'a {
        self.objects.values().filter(move |object| object.layer() == layer)
    }

    pub fn create_at(
        &self,
        map: &mut MixedMap,
        name: &str,
        position: Position,
    ) -> EditorResult<Vec<RemovedOccupant>> {
        self.get(name)?.create_at(map, position)
    }

    pub fn remove_at(
        &self,
        map: &mut MixedMap,
        name: &str,
        position: Position,
    ) -> EditorResult<Option<Vec<RemovedOccupant>>> {
        self.get(name)?.remove_at(map, position)
    }
}

/// Builds the canvas objects a level offers
pub struct CanvasObjectsFactory<'a> {
    config: &'a EditorConfig,
}

impl<'a> CanvasObjectsFactory<'a> {
    pub fn new(config: &'a EditorConfig) -> Self {
        Self { config }
    }

    pub fn create_canvas_objects(&self) -> CanvasObjectsManager {
        let mut manager = CanvasObjectsManager::new();
        match self.config.tilemap_kind {
            TilemapKind::WallsAndFloor => {
                manager.add(self.tile("floor", "floor"));
                manager.add(self.tile("wall", "walls"));
            }
            TilemapKind::Platforms => {
                manager.add(self.tile("platform", "platforms"));
            }
        }

        manager.add(
            CanvasObject::new(
                DELVER,
                self.representation(DELVER),
                PlacementAction::Entity {
                    layer: ESSENTIALS_LAYER.to_string(),
                },
            )
            .with_unique(true),
        );

        for variation in &self.config.goal_variations {
            manager.add(
                CanvasObject::new(
                    variation.clone(),
                    self.representation(&format!("{GOAL}/{variation}")),
                    PlacementAction::Variation {
                        object_name: GOAL.to_string(),
                        layer: ESSENTIALS_LAYER.to_string(),
                        variations: self.config.goal_variations.clone(),
                    },
                )
                .with_unique(true),
            );
        }
        manager
    }

    fn tile(&self, name: &str, layer: &str) -> CanvasObject {
        CanvasObject::new(
            name,
            self.representation(name),
            PlacementAction::Tile {
                layer: layer.to_string(),
            },
        )
    }

    fn representation(&self, name: &str) -> PathBuf {
        self.config.asset(&format!("img/representations/{name}.png"))
    }
}
