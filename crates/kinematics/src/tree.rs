//! Kinematic tree built from a robot description.
//!
//! Links are stored parent-before-child, so the forward kinematics of the whole tree is a single
//! pass over the link list, chaining each link's pose onto its parent like
//! `parent_to_base * joint_to_parent * motion(q)`.

use std::collections::{HashMap, VecDeque};

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use robot_description::{JointKind, RobotDescription};

use crate::{Error, Jacobian, JointVector, KinematicModel, LinkId, Result};

#[derive(Debug, Clone, Copy)]
enum JointMotion {
    /// Fixed joints, and movable joints that are not part of the joint vector.
    Locked,
    Revolute { q_index: usize },
    Prismatic { q_index: usize },
}

#[derive(Debug, Clone)]
struct TreeLink {
    name: String,
    parent: Option<usize>,
    /// Pose of the joint frame in the parent link frame.
    origin: Isometry3<f64>,
    axis: Unit<Vector3<f64>>,
    motion: JointMotion,
}

impl TreeLink {
    fn motion(&self, q: &[f64]) -> Isometry3<f64> {
        match self.motion {
            JointMotion::Locked => Isometry3::identity(),
            JointMotion::Revolute { q_index } => {
                Isometry3::rotation(self.axis.into_inner() * q[q_index])
            }
            JointMotion::Prismatic { q_index } => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * q[q_index]),
                UnitQuaternion::identity(),
            ),
        }
    }
}

/// A [`KinematicModel`] for a tree of revolute and prismatic joints.
///
/// The root link of the tree defines the base frame.
#[derive(Debug, Clone)]
pub struct KinematicTree<const N: usize> {
    links: Vec<TreeLink>,
    poses: Vec<Isometry3<f64>>,
}

impl<const N: usize> KinematicTree<N> {
    /// Build the tree for `description`, with the joint vector ordered like `joint_names`.
    ///
    /// Movable joints that are not named in `joint_names` are locked at zero.
    pub fn new(description: &RobotDescription, joint_names: &[String]) -> Result<Self> {
        if joint_names.len() != N {
            return Err(Error::JointCount {
                expected: N,
                actual: joint_names.len(),
            });
        }

        let q_indices = joint_indices(description, joint_names)?;
        let order = link_order(description)?;

        let index_of: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(index, name)| (*name, index))
            .collect();

        let links = order
            .iter()
            .map(|name| {
                let Some(joint) = description.parent_joint(name) else {
                    return TreeLink {
                        name: (*name).to_owned(),
                        parent: None,
                        origin: Isometry3::identity(),
                        axis: Vector3::z_axis(),
                        motion: JointMotion::Locked,
                    };
                };

                let motion = match (joint.kind, q_indices.get(joint.name.as_str())) {
                    (JointKind::Revolute | JointKind::Continuous, Some(&q_index)) => {
                        JointMotion::Revolute { q_index }
                    }
                    (JointKind::Prismatic, Some(&q_index)) => JointMotion::Prismatic { q_index },
                    (kind, _) => {
                        if kind.is_movable() {
                            tracing::warn!(joint = %joint.name, "joint is not actuated, locking it at zero");
                        }
                        JointMotion::Locked
                    }
                };

                TreeLink {
                    name: (*name).to_owned(),
                    parent: index_of.get(joint.parent.as_str()).copied(),
                    origin: joint.origin,
                    axis: joint.axis,
                    motion,
                }
            })
            .collect::<Vec<_>>();

        let poses = vec![Isometry3::identity(); links.len()];
        let mut tree = Self { links, poses };
        tree.update(&JointVector::zeros());

        Ok(tree)
    }

    /// Number of links in the tree.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Names of all links, parents before children.
    pub fn link_names(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|link| link.name.as_str())
    }
}

impl<const N: usize> KinematicModel<N> for KinematicTree<N> {
    fn link_id(&self, name: &str) -> Option<LinkId> {
        self.links
            .iter()
            .position(|link| link.name == name)
            .map(LinkId)
    }

    fn update(&mut self, q: &JointVector<N>) {
        let q = q.as_slice();
        for index in 0..self.links.len() {
            let link = &self.links[index];
            let parent_to_base = link
                .parent
                .map_or_else(Isometry3::identity, |parent| self.poses[parent]);
            self.poses[index] = parent_to_base * link.origin * link.motion(q);
        }
    }

    fn pose(&self, link: LinkId) -> Isometry3<f64> {
        self.poses[link.0]
    }

    fn jacobian(&self, link: LinkId, point: &Point3<f64>) -> Jacobian<N> {
        let mut jacobian = Jacobian::<N>::zeros();
        let point = self.poses[link.0] * point;

        let mut current = Some(link.0);
        while let Some(index) = current {
            let tree_link = &self.links[index];
            let pose = &self.poses[index];
            let axis = pose.rotation * tree_link.axis.into_inner();

            let (column, linear, angular) = match tree_link.motion {
                JointMotion::Locked => {
                    current = tree_link.parent;
                    continue;
                }
                JointMotion::Revolute { q_index } => {
                    let lever = point.coords - pose.translation.vector;
                    (q_index, axis.cross(&lever), axis)
                }
                JointMotion::Prismatic { q_index } => (q_index, axis, Vector3::zeros()),
            };

            for row in 0..3 {
                jacobian[(row, column)] += linear[row];
                jacobian[(row + 3, column)] += angular[row];
            }

            current = tree_link.parent;
        }

        jacobian
    }
}

/// Maps every joint name to its index in the joint vector.
fn joint_indices<'a>(
    description: &RobotDescription,
    joint_names: &'a [String],
) -> Result<HashMap<&'a str, usize>> {
    let mut indices = HashMap::with_capacity(joint_names.len());

    for (index, name) in joint_names.iter().enumerate() {
        let joint = description
            .joint(name)
            .ok_or_else(|| Error::UnknownJoint(name.clone()))?;

        if !joint.kind.is_movable() {
            return Err(Error::FixedJoint(name.clone()));
        }

        if indices.insert(name.as_str(), index).is_some() {
            return Err(Error::DuplicateJoint(name.clone()));
        }
    }

    Ok(indices)
}

/// Orders the links breadth-first from the single root link.
fn link_order(description: &RobotDescription) -> Result<Vec<&str>> {
    for joint in &description.joints {
        for link in [&joint.parent, &joint.child] {
            if description.link(link).is_none() {
                return Err(Error::UnknownLink {
                    joint: joint.name.clone(),
                    link: link.clone(),
                });
            }
        }

        let parents = description
            .joints
            .iter()
            .filter(|other| other.child == joint.child)
            .count();
        if parents > 1 {
            return Err(Error::MultipleParents(joint.child.clone()));
        }
    }

    let roots = description
        .links
        .iter()
        .filter(|link| description.parent_joint(&link.name).is_none())
        .map(|link| link.name.as_str())
        .collect::<Vec<_>>();

    let [root] = roots.as_slice() else {
        return Err(Error::Root(roots.iter().map(|&root| root.to_owned()).collect()));
    };

    let mut order = Vec::with_capacity(description.links.len());
    let mut queue = VecDeque::from([*root]);
    while let Some(name) = queue.pop_front() {
        order.push(name);
        queue.extend(
            description
                .joints
                .iter()
                .filter(|joint| joint.parent == name)
                .map(|joint| joint.child.as_str()),
        );
    }

    if order.len() != description.links.len() {
        let unreachable = description
            .links
            .iter()
            .filter(|link| !order.contains(&link.name.as_str()))
            .map(|link| link.name.clone())
            .collect();
        return Err(Error::Unreachable(unreachable));
    }

    Ok(order)
}
