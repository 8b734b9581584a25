use nalgebra::{Isometry3, Point3, Vector3};
use robot_description::{CollisionDescription, LinkDescription, Shape};

/// Collision geometry of a single primitive, in its own frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Undefined,
    /// A segment along the local z-axis, centered at the origin, swept by a sphere.
    Capsule { radius: f64, length: f64 },
    Sphere { radius: f64 },
    /// Convex hull of a set of vertices.
    Convex { vertices: Vec<Point3<f64>> },
    TriangleMesh { filename: String },
    Octomap,
}

/// The kind of a [`Geometry`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Undefined,
    Capsule,
    Sphere,
    Convex,
    TriangleMesh,
    Octomap,
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Undefined => GeometryKind::Undefined,
            Self::Capsule { .. } => GeometryKind::Capsule,
            Self::Sphere { .. } => GeometryKind::Sphere,
            Self::Convex { .. } => GeometryKind::Convex,
            Self::TriangleMesh { .. } => GeometryKind::TriangleMesh,
            Self::Octomap => GeometryKind::Octomap,
        }
    }

    /// The segment and radius of a sphere-swept geometry, in its own frame.
    ///
    /// Returns [`None`] for geometries without a distance routine.
    pub(crate) fn swept_sphere(&self) -> Option<(Point3<f64>, Point3<f64>, f64)> {
        match *self {
            Self::Sphere { radius } => Some((Point3::origin(), Point3::origin(), radius)),
            Self::Capsule { radius, length } => {
                let half = Vector3::z() * (length / 2.0);
                Some((Point3::from(-half), Point3::from(half), radius))
            }
            _ => None,
        }
    }
}

impl From<&Shape> for Geometry {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Sphere { radius } => Self::Sphere { radius: *radius },
            Shape::Capsule { radius, length } => Self::Capsule {
                radius: *radius,
                length: *length,
            },
            Shape::Box { size } => {
                let half = size / 2.0;
                let vertices = [-1.0, 1.0]
                    .into_iter()
                    .flat_map(|x| [-1.0, 1.0].into_iter().map(move |y| (x, y)))
                    .flat_map(|(x, y)| {
                        [-1.0, 1.0]
                            .into_iter()
                            .map(move |z| Point3::new(x * half.x, y * half.y, z * half.z))
                    })
                    .collect();
                Self::Convex { vertices }
            }
            Shape::Mesh { filename } => Self::TriangleMesh {
                filename: filename.clone(),
            },
        }
    }
}

/// A geometry attached to a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Pose of the geometry relative to the link frame.
    pub origin: Isometry3<f64>,
    pub geometry: Geometry,
}

impl From<&CollisionDescription> for Collision {
    fn from(description: &CollisionDescription) -> Self {
        Self {
            origin: description.origin,
            geometry: Geometry::from(&description.shape),
        }
    }
}

/// A link of the collision model and all of its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    pub collisions: Vec<Collision>,
}

impl From<&LinkDescription> for Link {
    fn from(description: &LinkDescription) -> Self {
        Self {
            name: description.name.clone(),
            collisions: description.collisions.iter().map(Collision::from).collect(),
        }
    }
}
