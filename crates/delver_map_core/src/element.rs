//! The trait shared by everything that occupies a grid cell

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::registry::tagged;
use crate::{Position, SerializationError};

/// An occupant of one cell of a layer
pub trait GridElement: Clone + fmt::Debug + Serialize {
    /// Tag written under `__class__` when serialized
    const CLASS: &'static str;

    fn position(&self) -> Position;

    /// Only layers move elements, keeping their keys in sync
    fn set_position(&mut self, position: Position);

    fn name(&self) -> &str;

    fn is_locked(&self) -> bool;

    fn set_locked(&mut self, locked: bool);

    /// Serialize with the `__class__` tag attached
    fn to_tagged(&self) -> Result<Value, SerializationError> {
        tagged(Self::CLASS, self)
    }
}
