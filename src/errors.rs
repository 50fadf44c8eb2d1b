// src/errors.rs

//! Crate-wide error types.

use std::path::PathBuf;

use thiserror::Error;

/// The filesystem could not be read while traversing a root.
///
/// Carries the offending path (a root, a directory or a single entry) and the
/// underlying cause.
#[derive(Error, Debug)]
#[error("cannot read {path:?}: {source}")]
pub struct TraversalError {
    pub path: PathBuf,
    pub source: anyhow::Error,
}

impl TraversalError {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PollwatchError {
    #[error("Traversal error: {0}")]
    Traversal(#[from] TraversalError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PollwatchError {
    /// The traversal failure behind this error, if any.
    pub fn as_traversal(&self) -> Option<&TraversalError> {
        match self {
            PollwatchError::Traversal(e) => Some(e),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PollwatchError>;
