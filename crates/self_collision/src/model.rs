use std::collections::HashSet;

use itertools::Itertools;
use nalgebra::Isometry3;
use robot_description::{RobotDescription, SemanticDescription};

use crate::distance::{Proximity, proximity};
use crate::{Collision, CollisionInfo, Error, GeometryKind, Link, Result};

/// A model of the collision geometry of a robot.
///
/// Links are addressed by their index in the model, geometry is immutable after construction.
pub trait CollisionModel: Send + Sync {
    fn link_count(&self) -> usize;

    fn link_name(&self, link: usize) -> Option<&str>;

    /// All geometry attached to `link`, empty for unknown links.
    fn link_collisions(&self, link: usize) -> &[Collision];

    /// Number of link pairs that are checked for collisions.
    fn pair_count(&self) -> usize;

    /// Writes a [`CollisionInfo`] for every eligible pair within `activation_dist` into `out`.
    ///
    /// `poses` holds the pose of every link in the base frame, indexed like the model. Candidates
    /// are written contiguously from the first slot, every other slot is reset to absent.
    /// Returns the number of candidates.
    fn collision_pairs(
        &self,
        poses: &[Isometry3<f64>],
        activation_dist: f64,
        out: &mut [CollisionInfo],
    ) -> Result<usize>;
}

/// [`CollisionModel`] for self-collisions between the links of a robot description.
#[derive(Debug, Clone)]
pub struct SelfCollisionModel {
    links: Vec<Link>,
    pairs: Vec<(usize, usize)>,
}

impl SelfCollisionModel {
    /// Every pair of links that both carry geometry is checked, unless the semantic description
    /// disables it.
    #[must_use]
    pub fn new(description: &RobotDescription, semantic: &SemanticDescription) -> Self {
        let links = description.links.iter().map(Link::from).collect::<Vec<_>>();

        let unsupported = links
            .iter()
            .flat_map(|link| &link.collisions)
            .map(|collision| collision.geometry.kind())
            .filter(|kind| !matches!(kind, GeometryKind::Sphere | GeometryKind::Capsule))
            .collect::<HashSet<_>>();
        for kind in unsupported {
            tracing::warn!(?kind, "geometry kind has no distance routine, it will be ignored");
        }

        let pairs = links
            .iter()
            .enumerate()
            .filter(|(_, link)| !link.collisions.is_empty())
            .tuple_combinations()
            .filter(|((_, link1), (_, link2))| !semantic.is_disabled(&link1.name, &link2.name))
            .map(|((index1, _), (index2, _))| (index1, index2))
            .collect::<Vec<_>>();

        tracing::debug!(
            links = links.len(),
            pairs = pairs.len(),
            "created self-collision model"
        );

        Self { links, pairs }
    }

    /// The eligible link pairs, lower index first.
    #[must_use]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    fn closest(
        &self,
        link1: usize,
        pose1: &Isometry3<f64>,
        link2: usize,
        pose2: &Isometry3<f64>,
    ) -> Option<Proximity> {
        let collisions1 = &self.links[link1].collisions;
        let collisions2 = &self.links[link2].collisions;

        collisions1
            .iter()
            .cartesian_product(collisions2)
            .filter_map(|(collision1, collision2)| {
                proximity(
                    &(pose1 * collision1.origin),
                    &collision1.geometry,
                    &(pose2 * collision2.origin),
                    &collision2.geometry,
                )
            })
            .min_by(|a, b| a.dist.total_cmp(&b.dist))
    }
}

impl CollisionModel for SelfCollisionModel {
    fn link_count(&self) -> usize {
        self.links.len()
    }

    fn link_name(&self, link: usize) -> Option<&str> {
        self.links.get(link).map(|link| link.name.as_str())
    }

    fn link_collisions(&self, link: usize) -> &[Collision] {
        self.links
            .get(link)
            .map(|link| link.collisions.as_slice())
            .unwrap_or_default()
    }

    fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    fn collision_pairs(
        &self,
        poses: &[Isometry3<f64>],
        activation_dist: f64,
        out: &mut [CollisionInfo],
    ) -> Result<usize> {
        if poses.len() != self.links.len() {
            return Err(Error::PoseCount {
                expected: self.links.len(),
                actual: poses.len(),
            });
        }

        let mut count = 0;
        for &(link1, link2) in &self.pairs {
            let Some(closest) = self.closest(link1, &poses[link1], link2, &poses[link2]) else {
                continue;
            };
            if closest.dist.is_nan() || closest.dist > activation_dist {
                continue;
            }

            if let Some(slot) = out.get_mut(count) {
                *slot = CollisionInfo {
                    link1_idx: link1 as i32,
                    link2_idx: link2 as i32,
                    p1: closest.p1,
                    p2: closest.p2,
                    n1: closest.normal,
                    n2: -closest.normal,
                    dist: closest.dist,
                };
            }
            count += 1;
        }

        if count > out.len() {
            return Err(Error::CapacityExceeded {
                required: count,
                capacity: out.len(),
            });
        }

        out[count..].fill(CollisionInfo::absent());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{point, vector};
    use robot_description::{parse_srdf, parse_urdf};

    const THREE_SPHERES: &str = r#"
        <robot name="spheres">
            <link name="a">
                <collision><geometry><sphere radius="0.1"/></geometry></collision>
            </link>
            <link name="empty"/>
            <link name="b">
                <collision>
                    <origin xyz="0 0 0.5"/>
                    <geometry><sphere radius="0.1"/></geometry>
                </collision>
                <collision><geometry><mesh filename="b.stl"/></geometry></collision>
            </link>
            <link name="c">
                <collision><geometry><capsule radius="0.1" length="0.4"/></geometry></collision>
            </link>
        </robot>
    "#;

    fn model(srdf: &str) -> SelfCollisionModel {
        SelfCollisionModel::new(&parse_urdf(THREE_SPHERES).unwrap(), &parse_srdf(srdf).unwrap())
    }

    #[test]
    fn pairs_skip_links_without_geometry() {
        let model = model(r#"<robot name="spheres"/>"#);
        assert_eq!(model.link_count(), 4);
        assert_eq!(model.pairs(), [(0, 2), (0, 3), (2, 3)]);
        assert_eq!(model.link_name(1), Some("empty"));
        assert!(model.link_collisions(1).is_empty());
        assert!(model.link_collisions(7).is_empty());
    }

    #[test]
    fn pairs_skip_disabled_links() {
        let model = model(
            r#"<robot name="spheres">
                <disable_collisions link1="c" link2="a" reason="Adjacent"/>
            </robot>"#,
        );
        assert_eq!(model.pair_count(), 2);
        assert_eq!(model.pairs(), [(0, 2), (2, 3)]);
    }

    #[test]
    fn writes_candidates_within_activation_distance() {
        let model = model(r#"<robot name="spheres"/>"#);
        let poses = [
            Isometry3::identity(),
            Isometry3::identity(),
            Isometry3::identity(),
            Isometry3::translation(5.0, 0.0, 0.0),
        ];
        let mut out = [CollisionInfo {
            link1_idx: 2,
            ..CollisionInfo::absent()
        }; 3];

        let count = model.collision_pairs(&poses, 0.35, &mut out).unwrap();
        assert_eq!(count, 1);

        let contact = out[0];
        assert_eq!((contact.link1_idx, contact.link2_idx), (0, 2));
        assert_relative_eq!(contact.dist, 0.3, epsilon = 1e-12);
        assert_relative_eq!(contact.p1, point![0.0, 0.0, 0.1], epsilon = 1e-12);
        assert_relative_eq!(contact.p2, point![0.0, 0.0, 0.4], epsilon = 1e-12);
        assert_relative_eq!(contact.n1, vector![0.0, 0.0, 1.0], epsilon = 1e-12);
        assert_relative_eq!(contact.n2, -contact.n1);

        assert!(out[1].is_absent());
        assert!(out[2].is_absent());
    }

    #[test]
    fn candidate_is_the_closest_geometry() {
        let model = model(r#"<robot name="spheres"/>"#);
        // the capsule of `c` stands upright, 0.25 to the side of `a`
        let poses = [
            Isometry3::identity(),
            Isometry3::identity(),
            Isometry3::translation(0.0, 0.0, 5.0),
            Isometry3::translation(0.25, 0.0, 0.0),
        ];
        let mut out = [CollisionInfo::absent(); 3];

        let count = model.collision_pairs(&poses, 0.1, &mut out).unwrap();
        assert_eq!(count, 1);
        assert_eq!((out[0].link1_idx, out[0].link2_idx), (0, 3));
        assert_relative_eq!(out[0].dist, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn undefined_distance_is_never_a_candidate() {
        let sphere = |radius| Link {
            name: "sphere".into(),
            collisions: vec![Collision {
                origin: Isometry3::identity(),
                geometry: crate::Geometry::Sphere { radius },
            }],
        };
        let model = SelfCollisionModel {
            links: vec![sphere(f64::NAN), sphere(0.1)],
            pairs: vec![(0, 1)],
        };
        let poses = [
            Isometry3::identity(),
            Isometry3::translation(100.0, 0.0, 0.0),
        ];
        let mut out = [CollisionInfo::absent(); 1];

        let count = model.collision_pairs(&poses, 0.1, &mut out).unwrap();
        assert_eq!(count, 0);
        assert!(out[0].is_absent());
    }

    #[test]
    fn too_many_candidates_is_an_error() {
        let model = model(r#"<robot name="spheres"/>"#);
        let poses = [Isometry3::identity(); 4];
        let mut out = [CollisionInfo::absent(); 2];

        let result = model.collision_pairs(&poses, 1.0, &mut out);
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded {
                required: 3,
                capacity: 2
            })
        ));
    }

    #[test]
    fn pose_count_must_match() {
        let model = model(r#"<robot name="spheres"/>"#);
        let mut out = [CollisionInfo::absent(); 3];
        let result = model.collision_pairs(&[Isometry3::identity()], 1.0, &mut out);
        assert!(matches!(
            result,
            Err(Error::PoseCount {
                expected: 4,
                actual: 1
            })
        ));
    }
}
