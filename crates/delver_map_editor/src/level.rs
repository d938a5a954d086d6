//! The level document: a named mixed map with hashing and persistence

use delver_map_core::registry::{field, parse_field};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::serialization::{level_registry, LoadContext};
use crate::{
    AssetPaths, EditorConfig, EditorError, EditorResult, MixedMap, DELVER, ESSENTIALS_LAYER, GOAL,
};

pub const DEFAULT_LEVEL_NAME: &str = "My custom level";

pub const LEVEL_FILE_NAME: &str = "level.json";

/// Presentation-only keys left out of the content hash
const PRESENTATION_KEYS: [&str; 2] = ["display", "icon_path"];

/// A level being edited
#[derive(Debug, Clone)]
pub struct Level {
    name: String,
    map: MixedMap,
}

impl Level {
    pub fn new(map: MixedMap) -> Self {
        Self {
            name: DEFAULT_LEVEL_NAME.to_string(),
            map,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn map(&self) -> &MixedMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MixedMap {
        &mut self.map
    }

    pub fn to_tagged(&self, paths: &AssetPaths) -> EditorResult<Value> {
        Ok(json!({
            "_name": self.name,
            "map": self.map.to_tagged(paths)?,
        }))
    }

    pub fn from_tagged(payload: &Value, paths: &AssetPaths) -> EditorResult<Self> {
        let name: String = parse_field(payload, "_name")?;
        let mut context = LoadContext::new(paths.clone());
        let map = level_registry()
            .deserialize_map(field(payload, "map")?, &mut context)?
            .into_mixed()?;
        Ok(Self { name, map })
    }

    /// SHA-256 of the level's gameplay content as lower-case hex.
    ///
    /// Presentation keys are dropped at every depth and the rest is hashed as
    /// compact JSON with sorted keys, so icon or visibility changes keep the hash.
    pub fn to_hash(&self, paths: &AssetPaths) -> EditorResult<String> {
        let mut payload = self.to_tagged(paths)?;
        strip_presentation(&mut payload);
        let bytes = serde_json::to_vec(&payload)?;
        Ok(to_hex_lower(&Sha256::digest(&bytes)))
    }

    /// `<save_folder>/<name>/level.json`. Names that would escape the folder are rejected.
    pub fn save_file_path(&self, save_folder: &Path) -> EditorResult<PathBuf> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EditorError::config("a level needs a name to be saved"));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(EditorError::config(format!(
                "'{}' cannot be used as a save folder name",
                self.name
            )));
        }
        Ok(save_folder.join(name).join(LEVEL_FILE_NAME))
    }

    /// Whether a level with this name already has a save folder
    pub fn same_name_saved(&self, save_folder: &Path) -> bool {
        self.save_file_path(save_folder)
            .ok()
            .and_then(|path| path.parent().map(Path::is_dir))
            .unwrap_or(false)
    }

    /// Save under the configured folder. Returns the written file.
    pub fn save(&self, config: &EditorConfig) -> EditorResult<PathBuf> {
        let path = self.save_file_path(&config.level_save_folder)?;
        self.write_to(&path, &config.asset_paths())?;
        Ok(path)
    }

    /// Write the level as pretty JSON, replacing `path` only once fully written
    pub fn write_to(&self, path: &Path, paths: &AssetPaths) -> EditorResult<()> {
        let text = serde_json::to_string_pretty(&self.to_tagged(paths)?)?;
        write_text_atomic(path, &text).map_err(|e| EditorError::io(path, e))?;

        let issues = self.issues();
        if issues.is_empty() {
            info!("Saved level '{}' to {}", self.name, path.display());
        } else {
            warn!(
                "Saved level '{}' to {} with open issues: {}",
                self.name,
                path.display(),
                issues.join(" ")
            );
        }
        Ok(())
    }

    pub fn load(path: &Path, paths: &AssetPaths) -> EditorResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EditorError::io(path, e))?;
        let payload: Value = serde_json::from_str(&text)?;
        let level = Self::from_tagged(&payload, paths)?;
        info!(
            "Loaded level '{}' ({} grid) from {}",
            level.name,
            level.map.grid_size(),
            path.display()
        );
        Ok(level)
    }

    /// Problems that keep the level from being playable
    pub fn issues(&self) -> Vec<String> {
        let essentials = self.map.get_world_objects_layer(ESSENTIALS_LAYER).ok();
        let has = |name: &str| essentials.is_some_and(|layer| layer.has_element_named(name));

        let mut issues = Vec::new();
        if !has(DELVER) {
            issues.push("The delver needs to be placed on the level.".to_string());
        }
        if !has(GOAL) {
            issues.push("The goal needs to be placed on the level.".to_string());
        }
        issues
    }
}

fn strip_presentation(value: &mut Value) {
    match value {
        Value::Object(object) => {
            for key in PRESENTATION_KEYS {
                object.remove(key);
            }
            object.values_mut().for_each(strip_presentation);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_presentation),
        _ => {}
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(LEVEL_FILE_NAME);
    path.with_file_name(format!("{file_name}.tmp"))
}
