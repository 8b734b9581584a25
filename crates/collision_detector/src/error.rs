//! Result and Error types for the crate.
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Collision detector error variants.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("activation distance must be finite and greater than zero, got {0}")]
    ActivationDistance(f64),

    #[error("expected {expected} joint names, got {actual}")]
    JointNames { expected: usize, actual: usize },

    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse collision detector configuration")]
    Deserialize(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Description(#[from] robot_description::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kinematics(#[from] kinematics::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Collision(#[from] self_collision::Error),

    #[error("collision link `{0}` does not exist in the kinematic model")]
    UnknownLink(String),

    #[error("collision model returned unknown link index {0}")]
    LinkIndex(i32),

    #[error("{pairs} eligible collision pairs exceed the capacity of {capacity}")]
    #[diagnostic(help("increase the pair capacity of the detector, or disable pairs in the semantic description"))]
    PairCapacity { pairs: usize, capacity: usize },

    #[error("no new data on input port `{0}`")]
    MissingInput(&'static str),

    #[error("collision detector is not running")]
    NotRunning,

    #[error("failed to write diagnostics: {0}")]
    Diagnostics(String),
}
