//! The level's maps
//!
//! A [`MixedMap`] composes an [`EditorTilemap`] (tile layers) and a
//! [`WorldObjectsMap`] (object layers) that always share one grid size.
//! Resizing goes through the mixed map only; user tile edits go through a
//! [`TilemapEditor`] borrowed from it, which can call back into the owner
//! to grow or collapse the grid.

mod editor_tilemap;
mod mixed_map;
mod tilemap_editor;
mod world_objects_map;

pub use editor_tilemap::EditorTilemap;
pub use mixed_map::{LayerRef, MixedMap, RemovedOccupant};
pub use tilemap_editor::TilemapEditor;
pub use world_objects_map::WorldObjectsMap;

use std::collections::{BTreeMap, BTreeSet};

/// Layer name -> names of the layers it is exclusive with
pub type ConcurrenceTable = BTreeMap<String, BTreeSet<String>>;

pub(crate) fn concurrence_table<'a>(
    pairs: impl IntoIterator<Item = &'a (String, String)>,
) -> ConcurrenceTable {
    let mut table = ConcurrenceTable::new();
    for (a, b) in pairs {
        table.entry(a.clone()).or_default().insert(b.clone());
        table.entry(b.clone()).or_default().insert(a.clone());
    }
    table
}

/// Sorted partners of `layer`
pub(crate) fn partners_of(table: &ConcurrenceTable, layer: &str) -> Vec<String> {
    table
        .get(layer)
        .map(|partners| partners.iter().cloned().collect())
        .unwrap_or_default()
}
