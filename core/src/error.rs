//! Error types for the core crate

use std::path::PathBuf;

use thiserror::Error;

/// A structural edit referenced an entity that does not exist.
///
/// These indicate that the editing surface and the model have drifted
/// apart, so the offending operation is aborted instead of guessed at.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("grid index {index} out of range ({len} grids)")]
    GridOutOfRange { index: usize, len: usize },

    #[error("item index {index} out of range in grid {grid} ({len} items)")]
    ItemOutOfRange { grid: usize, index: usize, len: usize },

    #[error("style index {index} out of range ({len} styles)")]
    StyleOutOfRange { index: usize, len: usize },

    #[error("threshold index {index} out of range in style {style} ({len} thresholds)")]
    ThresholdOutOfRange { style: usize, index: usize, len: usize },

    #[error("layout index {index} out of range ({len} layouts)")]
    LayoutOutOfRange { index: usize, len: usize },

    #[error("style '{0}' is built in and cannot be renamed or deleted")]
    BuiltInStyle(String),

    #[error("no grid or item is currently being edited")]
    NothingEdited,
}

/// Failures reading or writing persisted configuration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize overlay document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    #[error("options error: {0}")]
    Options(#[from] confy::ConfyError),
}
