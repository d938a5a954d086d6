//! Holds the level being edited and swaps it for new or loaded ones

use std::path::Path;
use tracing::{info, warn};

use crate::{AssetPaths, EditorConfig, EditorError, EditorResult, Level, LevelFactory};

/// Owner of the current level.
///
/// A level is only replaced once its replacement is fully built, so a
/// failed load leaves the current one in place.
#[derive(Debug)]
pub struct LevelLoader {
    config: EditorConfig,
    paths: AssetPaths,
    level: Option<Level>,
}

impl LevelLoader {
    /// A loader with no level yet
    pub fn new(config: EditorConfig) -> Self {
        let paths = config.asset_paths();
        Self {
            config,
            paths,
            level: None,
        }
    }

    /// A loader holding a freshly created level
    pub fn with_new_level(config: EditorConfig) -> EditorResult<Self> {
        let mut loader = Self::new(config);
        loader.create_new_level()?;
        Ok(loader)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn create_new_level(&mut self) -> EditorResult<&mut Level> {
        let level = LevelFactory::new(&self.config).create_level()?;
        Ok(self.level.insert(level))
    }

    /// Load `dir/file_name`, or start a new level when there is no such file
    pub fn load_level(&mut self, dir: &Path, file_name: &str) -> EditorResult<&mut Level> {
        let path = dir.join(file_name);
        if !path.is_file() {
            warn!("No level at {}, creating a new one", path.display());
            return self.create_new_level();
        }

        info!("Loading existing level from {}", path.display());
        let level = Level::load(&path, &self.paths)?;
        Ok(self.level.insert(level))
    }

    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    pub fn level(&self) -> EditorResult<&Level> {
        self.level.as_ref().ok_or_else(Self::no_level)
    }

    pub fn level_mut(&mut self) -> EditorResult<&mut Level> {
        self.level.as_mut().ok_or_else(Self::no_level)
    }

    fn no_level() -> EditorError {
        EditorError::config("the level doesn't exist")
    }
}
