//! Placed world objects

use delver_map_core::{GridElement, Position};
use serde::{Deserialize, Serialize, Serializer};

/// Tag prefix marking which variant of a variation group an object is
pub const VARIATION_TAG_PREFIX: &str = "variation_";

/// A world object placed on the level, such as the delver or the goal.
///
/// `name` matches the canvas object that creates it; variation groups share
/// one name and tell their members apart by a `variation_<variant>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObjectRepresentation {
    pub position: Position,
    pub name: String,
    #[serde(default, serialize_with = "serialize_sorted")]
    pub tags: Vec<String>,
    /// Set by edge locking, never by the user
    #[serde(default)]
    pub locked: bool,
    /// At most one object of this name per layer, enforced by the placer
    #[serde(default)]
    pub unique: bool,
}

impl WorldObjectRepresentation {
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            tags: Vec::new(),
            locked: false,
            unique: false,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The canvas object this was created from: the variant named by the
    /// first `variation_` tag, or the object's own name
    pub fn canvas_object_name(&self) -> &str {
        self.tags
            .iter()
            .find_map(|tag| tag.strip_prefix(VARIATION_TAG_PREFIX))
            .unwrap_or(&self.name)
    }
}

pub fn variation_tag(variant: &str) -> String {
    format!("{VARIATION_TAG_PREFIX}{variant}")
}

fn serialize_sorted<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    let mut sorted: Vec<&String> = tags.iter().collect();
    sorted.sort();
    sorted.serialize(serializer)
}

impl GridElement for WorldObjectRepresentation {
    const CLASS: &'static str = "WorldObjectRepresentation";

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
