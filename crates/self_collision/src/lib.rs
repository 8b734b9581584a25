//! # self_collision
//!
//! Collision geometry of a robot and the query for link pairs that are close to each other.
//!
//! The [`CollisionModel`] trait is what the collision detector consumes. [`SelfCollisionModel`]
//! implements it for the links of a [`RobotDescription`](robot_description::RobotDescription),
//! with the pairs excluded by the semantic description removed once at construction.
//!
//! Spheres and capsules are supported by the distance queries. Other geometry is kept in the
//! model, so it can be reported, but never produces a candidate contact.

pub mod contact;
mod distance;
pub mod error;
pub mod geometry;
pub mod model;

pub use contact::{ABSENT_LINK, CollisionInfo, CollisionPairs};
pub use error::{Error, Result};
pub use geometry::{Collision, Geometry, GeometryKind, Link};
pub use model::{CollisionModel, SelfCollisionModel};
