//! Distance queries between sphere-swept primitives.

use nalgebra::{Isometry3, Point3, Vector3};

use crate::Geometry;

const GEOM_EPSILON: f64 = 1e-10;

/// Closest points between two geometries, in the base frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Proximity {
    pub p1: Point3<f64>,
    pub p2: Point3<f64>,
    /// Unit normal at `p1`, pointing towards the second geometry.
    pub normal: Vector3<f64>,
    pub dist: f64,
}

/// Signed distance between two geometries placed in the base frame.
///
/// Returns [`None`] if either geometry has no distance routine.
pub(crate) fn proximity(
    pose1: &Isometry3<f64>,
    geometry1: &Geometry,
    pose2: &Isometry3<f64>,
    geometry2: &Geometry,
) -> Option<Proximity> {
    let (start1, end1, radius1) = geometry1.swept_sphere()?;
    let (start2, end2, radius2) = geometry2.swept_sphere()?;

    let (closest1, closest2) = closest_points_segments(
        pose1 * start1,
        pose1 * end1,
        pose2 * start2,
        pose2 * end2,
    );

    let offset = closest2 - closest1;
    let center_distance = offset.norm();
    let normal = if center_distance > GEOM_EPSILON {
        offset / center_distance
    } else {
        // coincident centers, any direction separates them equally well
        Vector3::z()
    };

    Some(Proximity {
        p1: closest1 + normal * radius1,
        p2: closest2 - normal * radius2,
        normal,
        dist: center_distance - radius1 - radius2,
    })
}

/// Closest points between the segments `p1 q1` and `p2 q2`.
#[allow(clippy::many_single_char_names)]
fn closest_points_segments(
    p1: Point3<f64>,
    q1: Point3<f64>,
    p2: Point3<f64>,
    q2: Point3<f64>,
) -> (Point3<f64>, Point3<f64>) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;

    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a < GEOM_EPSILON && e < GEOM_EPSILON {
        return (p1, p2);
    }
    if a < GEOM_EPSILON {
        let t = (f / e).clamp(0.0, 1.0);
        return (p1, p2 + d2 * t);
    }
    if e < GEOM_EPSILON {
        let s = (-d1.dot(&r) / a).clamp(0.0, 1.0);
        return (p1 + d1 * s, p2);
    }

    let b = d1.dot(&d2);
    let c = d1.dot(&r);
    #[allow(clippy::suspicious_operation_groupings)]
    let denom = a * e - b * b;

    // parallel segments pick the start of the first one
    let mut s = if denom.abs() < GEOM_EPSILON {
        0.0
    } else {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    };

    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    (p1 + d1 * s, p2 + d2 * t)
}
