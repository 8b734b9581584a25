//! # collision_detector
//!
//! Cyclic self-collision filter for a robot motion controller.
//!
//! Every cycle the [`CollisionDetector`] takes the joint positions and velocities of the robot,
//! computes the pose of every link, and asks the collision model for the link pairs within the
//! activation distance. Of those, only the pairs whose contact points close in on each other
//! faster than [`CLOSING_RATE_THRESHOLD`] end up in the fixed-capacity output list.
//!
//! The [`CollisionDetectorPlugin`] hosts the detector in a bevy app, running one cycle per frame.

pub mod approach;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod plugin;

pub use approach::{CLOSING_RATE_THRESHOLD, closing_rate, closing_sensitivity};
pub use config::CollisionDetectorConfig;
pub use detector::{
    CollisionDetector, CollisionSnapshot, DetectorState, JointState, SharedCollisions,
};
pub use diagnostics::DiagnosticsReporter;
pub use error::{Error, Result};
pub use plugin::CollisionDetectorPlugin;
