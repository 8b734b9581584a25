//! Result and Error types for the crate.
use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinematic model construction errors.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("expected {expected} joint names, got {actual}")]
    JointCount { expected: usize, actual: usize },

    #[error("joint `{0}` does not exist in the robot description")]
    UnknownJoint(String),

    #[error("joint `{0}` is fixed and cannot be part of the joint vector")]
    FixedJoint(String),

    #[error("joint `{0}` is listed more than once")]
    DuplicateJoint(String),

    #[error("joint `{joint}` references unknown link `{link}`")]
    UnknownLink { joint: String, link: String },

    #[error("link `{0}` is the child of more than one joint")]
    MultipleParents(String),

    #[error("robot description must have exactly one root link, found {0:?}")]
    Root(Vec<String>),

    #[error("links {0:?} are not connected to the root link")]
    #[diagnostic(help("the joints of the robot description probably form a loop"))]
    Unreachable(Vec<String>),
}
