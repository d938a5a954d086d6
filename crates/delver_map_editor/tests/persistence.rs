//! Save, load and hashing of whole levels

use delver_map_editor::delver_map_core::{GridError, SerializationError};
use delver_map_editor::{
    Edge, EditorConfig, EditorError, GridSize, Level, LevelFactory, LevelLoader, Position,
    ESSENTIALS_LAYER, LEVEL_FILE_NAME,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn config_in(root: &Path) -> EditorConfig {
    EditorConfig {
        project_root: root.to_path_buf(),
        level_save_folder: root.join("levels"),
        ..EditorConfig::default()
    }
}

/// A level with a resize, a moved delver, another goal variant and a hidden layer
fn edited_level(config: &EditorConfig) -> Level {
    let factory = LevelFactory::new(config);
    let canvas_objects = factory.canvas_objects();
    let mut level = factory.create_level().unwrap();
    level.set_name("Crossing");

    let map = level.map_mut();
    map.multidirectional_expand_towards(&[Edge::Left, Edge::Bottom], 2);
    canvas_objects
        .create_at(map, "delver", Position::new(5, 5))
        .unwrap();
    canvas_objects
        .create_at(map, "uranium_cake", Position::new(8, 2))
        .unwrap();
    map.get_tilemap_layer_mut("floor").unwrap().display.visible = false;
    level
}

#[test]
fn test_round_trip_keeps_hash() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let paths = config.asset_paths();
    let level = edited_level(&config);

    let path = level.save(&config).unwrap();
    assert_eq!(path, tmp.path().join("levels/Crossing").join(LEVEL_FILE_NAME));

    let loaded = Level::load(&path, &paths).unwrap();
    assert_eq!(loaded.name(), "Crossing");
    assert_eq!(loaded.to_hash(&paths).unwrap(), level.to_hash(&paths).unwrap());

    let (original, restored) = (level.map(), loaded.map());
    assert_eq!(restored.grid_size(), original.grid_size());
    assert_eq!(restored.layer_order(), original.layer_order());
    assert_eq!(restored.concurrence_table(), original.concurrence_table());
    assert_eq!(restored.tilemap().locked_edges(), original.tilemap().locked_edges());
    assert!(!restored.get_tilemap_layer("floor").unwrap().display.visible);
    assert_eq!(
        restored.get_tilemap_layer("walls").unwrap().icon_path(),
        original.get_tilemap_layer("walls").unwrap().icon_path()
    );
}

#[test]
fn test_saved_file_is_portable() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let path = edited_level(&config).save(&config).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"_name\": \"Crossing\",\n  \"map\""));
    assert!(!text.contains(&*tmp.path().to_string_lossy()));

    let payload: Value = serde_json::from_str(&text).unwrap();
    let layers = payload["map"]["tilemap"]["layers"].as_array().unwrap();
    assert_eq!(layers[0]["tileset"], "/assets/img/tilesets/dungeon/floor.png");
    assert_eq!(layers[1]["icon_path"], "/assets/svg/walls.svg");
    assert_eq!(
        payload["map"]["world_objects_map"]["layers"][0]["concurrent_layers"],
        serde_json::json!(["walls"])
    );
}

#[test]
fn test_loaded_level_on_other_root() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let config = config_in(first.path());
    let path = edited_level(&config).save(&config).unwrap();

    let other = config_in(second.path()).asset_paths();
    let loaded = Level::load(&path, &other).unwrap();
    let walls = loaded.map().get_tilemap_layer("walls").unwrap();
    assert_eq!(
        walls.tileset().path(),
        second.path().join("assets/img/tilesets/dungeon/walls.png")
    );
}

#[test]
fn test_hash_changes_with_gameplay_only() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let paths = config.asset_paths();
    let level = edited_level(&config);
    let hash = level.to_hash(&paths).unwrap();

    let mut cosmetic = level.clone();
    cosmetic
        .map_mut()
        .get_world_objects_layer_mut(ESSENTIALS_LAYER)
        .unwrap()
        .display
        .visible = false;
    cosmetic.map_mut().get_tilemap_layer_mut("walls").unwrap().icon_path =
        tmp.path().join("assets/svg/other.svg");
    assert_eq!(cosmetic.to_hash(&paths).unwrap(), hash);

    let mut moved = level.clone();
    let canvas_objects = LevelFactory::new(&config).canvas_objects();
    canvas_objects
        .create_at(moved.map_mut(), "delver", Position::new(4, 4))
        .unwrap();
    assert_ne!(moved.to_hash(&paths).unwrap(), hash);

    let mut retagged = level.clone();
    canvas_objects
        .create_at(retagged.map_mut(), "oil_drink", Position::new(8, 2))
        .unwrap();
    assert_ne!(retagged.to_hash(&paths).unwrap(), hash);
}

fn rewrite(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut payload: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut payload);
    fs::write(path, serde_json::to_string_pretty(&payload).unwrap()).unwrap();
}

#[test]
fn test_unknown_class_fails_load() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let path = edited_level(&config).save(&config).unwrap();
    rewrite(&path, |payload| {
        payload["map"]["tilemap"]["layers"][0]["__class__"] = "HexLayer".into();
    });

    let result = Level::load(&path, &config.asset_paths());
    assert!(matches!(
        result,
        Err(EditorError::Serialization(SerializationError::UnknownTag { ref tag, .. })) if tag == "HexLayer"
    ));
}

#[test]
fn test_missing_concurrence_partner_fails_load() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let path = edited_level(&config).save(&config).unwrap();
    rewrite(&path, |payload| {
        payload["map"]["tilemap"]["layers"][1]["concurrent_layers"] =
            serde_json::json!(["essentials", "floor", "lava"]);
    });

    let result = Level::load(&path, &config.asset_paths());
    assert!(matches!(
        result,
        Err(EditorError::Serialization(SerializationError::Grid(GridError::LayerNotFound(ref name)))) if name == "lava"
    ));
}

#[test]
fn test_sub_map_size_mismatch_fails_load() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let path = edited_level(&config).save(&config).unwrap();
    rewrite(&path, |payload| {
        payload["map"]["world_objects_map"]["grid_size"] = serde_json::json!([12, 9]);
    });

    let result = Level::load(&path, &config.asset_paths());
    assert!(matches!(
        result,
        Err(EditorError::Serialization(SerializationError::Mismatch(_)))
    ));
}

#[test]
fn test_loader_switches_levels() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let saved = edited_level(&config);
    let path = saved.save(&config).unwrap();
    assert!(saved.same_name_saved(&config.level_save_folder));

    let mut loader = LevelLoader::with_new_level(config.clone()).unwrap();
    assert_eq!(loader.level().unwrap().map().grid_size(), GridSize::new(9, 7));

    let dir = path.parent().unwrap();
    let loaded = loader.load_level(dir, LEVEL_FILE_NAME).unwrap();
    assert_eq!(loaded.name(), "Crossing");
    assert_eq!(loaded.map().grid_size(), GridSize::new(11, 9));

    fs::write(dir.join("broken.json"), "[]").unwrap();
    assert!(loader.load_level(dir, "broken.json").is_err());
    assert_eq!(loader.level().unwrap().name(), "Crossing");

    let fresh = loader.load_level(&tmp.path().join("nowhere"), LEVEL_FILE_NAME).unwrap();
    assert_eq!(fresh.map().grid_size(), GridSize::new(9, 7));
}
