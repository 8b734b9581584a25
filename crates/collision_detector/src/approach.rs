//! Rate at which the two contact points of a candidate pair close in on each other.

use kinematics::{JointVector, KinematicModel, LinkId};
use nalgebra::{Isometry3, Point3, Vector3};
use self_collision::CollisionInfo;

/// Pairs closing faster than this are reported, in meters per second.
pub const CLOSING_RATE_THRESHOLD: f64 = 0.01;

/// A contact point and normal, re-expressed for one of the two links.
struct LinkContact {
    /// Contact point in the link frame.
    point: Point3<f64>,
    /// Contact normal in the base frame.
    direction: Vector3<f64>,
}

impl LinkContact {
    fn new(link_to_base: &Isometry3<f64>, point: &Point3<f64>, normal: &Vector3<f64>) -> Self {
        let base_to_link = link_to_base.inverse();
        let local_normal = base_to_link.rotation * normal;

        Self {
            point: base_to_link * point,
            direction: link_to_base.rotation * local_normal,
        }
    }
}

/// Sensitivity of the closing rate of `contact` to each joint velocity.
///
/// This is the sum of the linear Jacobian rows of both contact points, projected on their contact
/// normals. The kinematic model must be updated for the current joint positions.
pub fn closing_sensitivity<const N: usize, K>(
    kinematics: &K,
    (link1, link2): (LinkId, LinkId),
    contact: &CollisionInfo,
) -> JointVector<N>
where
    K: KinematicModel<N> + ?Sized,
{
    let contact1 = LinkContact::new(&kinematics.pose(link1), &contact.p1, &contact.n1);
    let contact2 = LinkContact::new(&kinematics.pose(link2), &contact.p2, &contact.n2);

    let (jacobian1, jacobian2) =
        kinematics.jacobians_for_pair(link1, &contact1.point, link2, &contact2.point);

    jacobian1.fixed_rows::<3>(0).tr_mul(&contact1.direction)
        + jacobian2.fixed_rows::<3>(0).tr_mul(&contact2.direction)
}

/// Closing rate of `contact` for the joint velocities `dq`, positive when the links approach.
pub fn closing_rate<const N: usize, K>(
    kinematics: &K,
    links: (LinkId, LinkId),
    contact: &CollisionInfo,
    dq: &JointVector<N>,
) -> f64
where
    K: KinematicModel<N> + ?Sized,
{
    closing_sensitivity(kinematics, links, contact).dot(dq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinematics::{Jacobian, KinematicTree};
    use nalgebra::{point, vector};
    use robot_description::parse_urdf;

    /// A base and a tip link, the tip slides along the base x-axis and spins around it.
    const SLIDER: &str = r#"
        <robot name="slider">
            <link name="base"/>
            <link name="carriage"/>
            <link name="tip"/>
            <joint name="slide" type="prismatic">
                <parent link="base"/>
                <child link="carriage"/>
                <axis xyz="1 0 0"/>
            </joint>
            <joint name="spin" type="continuous">
                <parent link="carriage"/>
                <child link="tip"/>
                <origin xyz="0.5 0 0"/>
                <axis xyz="1 0 0"/>
            </joint>
        </robot>
    "#;

    fn slider() -> KinematicTree<2> {
        let description = parse_urdf(SLIDER).unwrap();
        KinematicTree::new(&description, &["slide".to_owned(), "spin".to_owned()]).unwrap()
    }

    /// Contact between a wall on the base at x = 1 and the tip, 0.2 in front of it.
    fn wall_contact(tip_x: f64) -> CollisionInfo {
        CollisionInfo {
            link1_idx: 0,
            link2_idx: 2,
            p1: point![1.0, 0.0, 0.0],
            p2: point![tip_x, 0.0, 0.0],
            n1: -Vector3::x(),
            n2: Vector3::x(),
            dist: 1.0 - tip_x,
        }
    }

    #[test]
    fn sliding_towards_the_wall_closes() {
        let mut kinematics = slider();
        kinematics.update(&vector![0.3, 0.0]);
        let links = (
            kinematics.link_id("base").unwrap(),
            kinematics.link_id("tip").unwrap(),
        );
        let contact = wall_contact(0.8);

        let sensitivity = closing_sensitivity(&kinematics, links, &contact);
        assert_relative_eq!(sensitivity, vector![1.0, 0.0], epsilon = 1e-12);

        assert_relative_eq!(
            closing_rate(&kinematics, links, &contact, &vector![0.25, 3.0]),
            0.25,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            closing_rate(&kinematics, links, &contact, &vector![-0.25, 0.0]),
            -0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn spinning_about_the_normal_does_not_close() {
        let mut kinematics = slider();
        kinematics.update(&vector![0.3, 1.2]);
        let links = (
            kinematics.link_id("base").unwrap(),
            kinematics.link_id("tip").unwrap(),
        );

        let rate = closing_rate(&kinematics, links, &wall_contact(0.8), &vector![0.0, 5.0]);
        assert_relative_eq!(rate, 0.0, epsilon = 1e-12);
    }

    /// Reports fixed Jacobians, to check how the rows are combined.
    struct FixedJacobians {
        jacobian1: Jacobian<2>,
        jacobian2: Jacobian<2>,
    }

    impl KinematicModel<2> for FixedJacobians {
        fn link_id(&self, _name: &str) -> Option<LinkId> {
            None
        }

        fn update(&mut self, _q: &JointVector<2>) {}

        fn pose(&self, link: LinkId) -> Isometry3<f64> {
            Isometry3::translation(link.0 as f64, 0.0, 0.0)
        }

        fn jacobian(&self, link: LinkId, _point: &Point3<f64>) -> Jacobian<2> {
            if link.0 == 0 {
                self.jacobian1
            } else {
                self.jacobian2
            }
        }
    }

    #[test]
    fn angular_rows_are_ignored() {
        let mut jacobian1 = Jacobian::<2>::zeros();
        jacobian1[(1, 0)] = 2.0;
        jacobian1[(4, 1)] = 100.0;
        let mut jacobian2 = Jacobian::<2>::zeros();
        jacobian2[(1, 1)] = 3.0;
        jacobian2[(5, 0)] = 100.0;

        let kinematics = FixedJacobians {
            jacobian1,
            jacobian2,
        };
        let contact = CollisionInfo {
            link1_idx: 0,
            link2_idx: 1,
            n1: Vector3::y(),
            n2: -Vector3::y(),
            ..CollisionInfo::absent()
        };

        let sensitivity = closing_sensitivity(&kinematics, (LinkId(0), LinkId(1)), &contact);
        assert_relative_eq!(sensitivity, vector![2.0, -3.0], epsilon = 1e-12);
    }
}
