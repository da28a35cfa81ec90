//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or running [`BorderAtariEnv`](crate::BorderAtariEnv).
#[derive(Debug, Error)]
pub enum AtariEnvError {
    /// The scenario id is malformed or names a game whose ROM is not found.
    #[error("Failed to create environment {id}: {reason}")]
    EnvironmentCreation { id: String, reason: String },

    /// A directory or file for recording could not be created or written.
    #[error("File system error at {path:?}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A wrapper stage is misplaced or received pixels it cannot handle.
    #[error("Invalid preprocessing pipeline: {0}")]
    Pipeline(String),

    /// The action index is out of the minimal action set.
    #[error("Action {action} is out of the action set of size {n_actions}")]
    InvalidAction { action: usize, n_actions: usize },
}
