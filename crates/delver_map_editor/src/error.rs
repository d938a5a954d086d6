//! Error type shared by the editor engine

use delver_map_core::{GridError, SerializationError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by level editing, persistence and configuration
#[derive(Debug, Error)]
pub enum EditorError {
    /// Misuse or misconfiguration: unset level, unresolvable save path, invalid config
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to parse level JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown canvas object '{0}'")]
    UnknownCanvasObject(String),
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
