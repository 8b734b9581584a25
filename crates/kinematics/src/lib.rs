//! # kinematics
//!
//! Forward and differential kinematics for a robot with `N` actuated joints.
//!
//! The [`KinematicModel`] trait is the interface the collision detector consumes: it turns a
//! [`JointVector`] into the pose of every link in the base frame, and produces the spatial
//! [`Jacobian`] of any point fixed to a link. [`KinematicTree`] implements it for a tree of
//! revolute and prismatic joints read from a [`RobotDescription`](robot_description::RobotDescription).

use nalgebra::{Isometry3, Point3, SMatrix, SVector};

pub mod error;
pub mod tree;

pub use error::{Error, Result};
pub use tree::KinematicTree;

/// Joint positions or velocities, ordered like the configured joint names.
pub type JointVector<const N: usize> = SVector<f64, N>;

/// Spatial Jacobian of a point fixed to a link.
///
/// Rows `0..3` map joint velocities to the linear velocity of the point, rows `3..6` to the
/// angular velocity of the link. Both are expressed in the base frame.
pub type Jacobian<const N: usize> = SMatrix<f64, 6, N>;

/// Handle to a link of a [`KinematicModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// A kinematic model of a robot with `N` actuated joints.
pub trait KinematicModel<const N: usize>: Send + Sync {
    /// Looks up a link by name.
    fn link_id(&self, name: &str) -> Option<LinkId>;

    /// Computes the forward kinematics of every link for the joint positions `q`.
    fn update(&mut self, q: &JointVector<N>);

    /// Pose of `link` in the base frame, as of the last [`KinematicModel::update`].
    fn pose(&self, link: LinkId) -> Isometry3<f64>;

    /// Jacobian of `point`, given in the frame of `link`, as of the last
    /// [`KinematicModel::update`].
    fn jacobian(&self, link: LinkId, point: &Point3<f64>) -> Jacobian<N>;

    /// Jacobians of two contact points on two links.
    fn jacobians_for_pair(
        &self,
        link1: LinkId,
        point1: &Point3<f64>,
        link2: LinkId,
        point2: &Point3<f64>,
    ) -> (Jacobian<N>, Jacobian<N>) {
        (self.jacobian(link1, point1), self.jacobian(link2, point2))
    }
}
