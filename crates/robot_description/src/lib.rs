//! # robot_description
//!
//! Plain data read from the two model-description payloads of a robot:
//!
//! - the robot description (URDF): links, their collision primitives and the joints connecting
//!   them, see [`parse_urdf`].
//! - the semantic description (SRDF): link pairs excluded from self-collision checking, see
//!   [`parse_srdf`].
//!
//! Only the subset needed by the kinematic and collision models is read, everything else
//! (visuals, inertials, limits, groups) is skipped.

pub mod error;
pub mod srdf;
pub mod urdf;
mod xml;

pub use error::{Error, Result};
pub use srdf::{SemanticDescription, parse_srdf};
pub use urdf::{
    CollisionDescription, JointDescription, JointKind, LinkDescription, RobotDescription, Shape,
    parse_urdf,
};
