//! Reader for the subset of URDF used by the kinematic and collision models.

use std::io::BufRead;

use nalgebra::{Isometry3, Unit, Vector3};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::xml::{self, attribute, positive_attribute, vector_attribute};
use crate::{Error, Result};

/// The kinematic tree and collision geometry of a robot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotDescription {
    pub name: String,
    /// Links in document order.
    pub links: Vec<LinkDescription>,
    /// Joints in document order.
    pub joints: Vec<JointDescription>,
}

impl RobotDescription {
    #[must_use]
    pub fn link(&self, name: &str) -> Option<&LinkDescription> {
        self.links.iter().find(|link| link.name == name)
    }

    #[must_use]
    pub fn joint(&self, name: &str) -> Option<&JointDescription> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    /// The joint whose child is `link`, if any.
    #[must_use]
    pub fn parent_joint(&self, link: &str) -> Option<&JointDescription> {
        self.joints.iter().find(|joint| joint.child == link)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDescription {
    pub name: String,
    pub collisions: Vec<CollisionDescription>,
}

/// A single collision primitive attached to a link.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionDescription {
    /// Pose of the primitive relative to the link frame.
    pub origin: Isometry3<f64>,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f64 },
    /// Cylinders are read as capsules, the axis is the local z-axis.
    Capsule { radius: f64, length: f64 },
    Box { size: Vector3<f64> },
    Mesh { filename: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
}

impl JointKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "revolute" => Some(Self::Revolute),
            "continuous" => Some(Self::Continuous),
            "prismatic" => Some(Self::Prismatic),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_movable(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointDescription {
    pub name: String,
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    /// Pose of the joint frame relative to the parent link frame.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint frame.
    pub axis: Unit<Vector3<f64>>,
}

/// Parse a URDF document.
pub fn parse_urdf(xml: &str) -> Result<RobotDescription> {
    let mut reader = xml::reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"robot" => {
                return parse_robot(&mut reader, e);
            }
            Ok(Event::Eof) => return Err(Error::missing_element("robot", "URDF document")),
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }
}

fn parse_robot<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<RobotDescription> {
    let mut robot = RobotDescription {
        name: attribute(start, "name")?,
        ..Default::default()
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"link" => robot.links.push(parse_link(reader, e)?),
                    b"joint" => robot.joints.push(parse_joint(reader, e)?),
                    _ => xml::skip_element(reader, &name)?,
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"link" => {
                robot.links.push(LinkDescription {
                    name: attribute(e, "name")?,
                    collisions: Vec::new(),
                });
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"robot" => break,
            Ok(Event::Eof) => return Err(Error::Xml("unexpected end of file in `robot`".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(robot)
}

fn parse_link<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<LinkDescription> {
    let mut link = LinkDescription {
        name: attribute(start, "name")?,
        collisions: Vec::new(),
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"collision" {
                    let context = format!("collision of link `{}`", link.name);
                    link.collisions.push(parse_collision(reader, &context)?);
                } else {
                    xml::skip_element(reader, &name)?;
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(Error::Xml("unexpected end of file in `link`".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(link)
}

fn parse_collision<R: BufRead>(reader: &mut Reader<R>, context: &str) -> Result<CollisionDescription> {
    let mut origin = Isometry3::identity();
    let mut shape = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"origin" => origin = xml::origin(e)?,
                b"geometry" => shape = Some(parse_geometry(reader, context)?),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"origin" => origin = xml::origin(e)?,
                b"geometry" => return Err(Error::missing_element("shape", context)),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"collision" => break,
            Ok(Event::Eof) => {
                return Err(Error::Xml("unexpected end of file in `collision`".into()));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    let shape = shape.ok_or_else(|| Error::missing_element("geometry", context))?;
    Ok(CollisionDescription { origin, shape })
}

fn parse_geometry<R: BufRead>(reader: &mut Reader<R>, context: &str) -> Result<Shape> {
    let mut shape = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.name().as_ref() {
                b"sphere" => {
                    shape = Some(Shape::Sphere {
                        radius: positive_attribute(e, "radius")?,
                    });
                }
                b"capsule" | b"cylinder" => {
                    shape = Some(Shape::Capsule {
                        radius: positive_attribute(e, "radius")?,
                        length: positive_attribute(e, "length")?,
                    });
                }
                b"box" => {
                    let size = vector_attribute(e, "size")?.ok_or_else(|| {
                        Error::MissingAttribute {
                            attribute: "size",
                            element: "box".into(),
                        }
                    })?;
                    if !size.iter().all(|side| side.is_finite() && *side > 0.0) {
                        return Err(Error::InvalidAttribute {
                            attribute: "size",
                            element: "box".into(),
                            value: format!("{} {} {}", size.x, size.y, size.z),
                        });
                    }
                    shape = Some(Shape::Box { size });
                }
                b"mesh" => {
                    shape = Some(Shape::Mesh {
                        filename: attribute(e, "filename")?,
                    });
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"geometry" => break,
            Ok(Event::Eof) => return Err(Error::Xml("unexpected end of file in `geometry`".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    shape.ok_or_else(|| Error::missing_element("shape", context))
}

fn parse_joint<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<JointDescription> {
    let name = attribute(start, "name")?;
    let kind = attribute(start, "type")?;
    let kind = JointKind::parse(&kind).ok_or_else(|| Error::UnknownJointType {
        joint: name.clone(),
        kind,
    })?;

    let mut parent = None;
    let mut child = None;
    let mut origin = Isometry3::identity();
    let mut axis = Vector3::z();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.name().as_ref() {
                b"parent" => parent = Some(attribute(e, "link")?),
                b"child" => child = Some(attribute(e, "link")?),
                b"origin" => origin = xml::origin(e)?,
                b"axis" => {
                    if let Some(xyz) = vector_attribute(e, "xyz")? {
                        axis = xyz;
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"joint" => break,
            Ok(Event::Eof) => return Err(Error::Xml("unexpected end of file in `joint`".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    let parent = parent.ok_or_else(|| Error::missing_element("parent", format!("joint `{name}`")))?;
    let child = child.ok_or_else(|| Error::missing_element("child", format!("joint `{name}`")))?;
    let axis = Unit::try_new(axis, f64::EPSILON).ok_or_else(|| Error::ZeroAxis(name.clone()))?;

    Ok(JointDescription {
        name,
        kind,
        parent,
        child,
        origin,
        axis,
    })
}
