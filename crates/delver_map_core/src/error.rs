//! Error types for grid operations and tagged payloads

use std::fmt;
use thiserror::Error;

use crate::Position;

/// Lookup failures on maps and layers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Layer '{0}' not found")]
    LayerNotFound(String),
    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),
    #[error("No element on layer '{layer}' at {position}")]
    ElementNotFound { layer: String, position: Position },
    #[error("Position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: u32,
        height: u32,
    },
}

/// The three kinds of tagged payload a registry can rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Element,
    Layer,
    Map,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Element => write!(f, "element"),
            PayloadKind::Layer => write!(f, "layer"),
            PayloadKind::Map => write!(f, "map"),
        }
    }
}

/// Errors raised while writing or rebuilding tagged payloads
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("No {kind} deserializer registered for '{tag}'")]
    UnknownTag { kind: PayloadKind, tag: String },
    #[error("Payload has no '__class__' tag")]
    MissingClass,
    #[error("Payload is missing field '{0}'")]
    MissingField(String),
    #[error("Expected a {expected} payload, found '{found}'")]
    WrongKind { expected: String, found: String },
    #[error("Inconsistent payload: {0}")]
    Mismatch(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
