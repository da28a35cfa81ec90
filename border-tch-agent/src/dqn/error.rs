//! Errors in loading parameters of Q-networks.
use std::path::PathBuf;
use tch::TchError;
use thiserror::Error;

/// Errors in loading parameters from a file.
#[derive(Error, Debug)]
pub enum WeightLoadError {
    /// The parameter file does not exist.
    #[error("Parameter file not found: {0:?}")]
    FileNotFound(PathBuf),

    /// The parameter file exists but could not be read.
    #[error("Failed to read parameter file {path:?}")]
    Unreadable {
        /// Path of the file.
        path: PathBuf,

        /// Error reported by libtorch.
        #[source]
        source: TchError,
    },

    /// A parameter of the network is not in the file.
    #[error("Parameter {0} is missing in the file")]
    MissingParameter(String),

    /// The file has a parameter the network does not have.
    #[error("Unexpected parameter {0} in the file")]
    UnexpectedParameter(String),

    /// A parameter in the file has a shape different from the network.
    #[error("Shape mismatch of parameter {name}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Name of the parameter.
        name: String,

        /// Shape in the network.
        expected: Vec<i64>,

        /// Shape in the file.
        found: Vec<i64>,
    },

    /// Copying a parameter into the network failed.
    #[error("Failed to copy parameter {name}")]
    Copy {
        /// Name of the parameter.
        name: String,

        /// Error reported by libtorch.
        #[source]
        source: TchError,
    },
}
