//! Result and Error types for the crate.
use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Collision query errors.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("expected a pose for each of the {expected} links, got {actual}")]
    PoseCount { expected: usize, actual: usize },

    #[error("{required} candidate pairs do not fit in an output list of {capacity}")]
    #[diagnostic(help("the pair capacity must be at least the number of eligible link pairs"))]
    CapacityExceeded { required: usize, capacity: usize },
}
