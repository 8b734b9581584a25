//! XML snapshot of the collision state, for external inspection.

use std::fmt::Display;
use std::sync::{Arc, PoisonError};

use bevy::prelude::Resource;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use self_collision::{CollisionInfo, CollisionModel, Geometry};

use crate::detector::SharedCollisions;
use crate::{Error, Result};

/// Renders the published collision snapshot, and the geometry of one link per report.
///
/// Reports only read the published snapshot, so they can be made while the detector runs.
#[derive(Resource, Clone)]
pub struct DiagnosticsReporter<const NPAIRS: usize> {
    snapshot: SharedCollisions<NPAIRS>,
    collision_model: Arc<dyn CollisionModel>,
    /// The link whose geometry goes into the next report.
    cursor: usize,
}

impl<const NPAIRS: usize> DiagnosticsReporter<NPAIRS> {
    #[must_use]
    pub fn new(snapshot: SharedCollisions<NPAIRS>, collision_model: Arc<dyn CollisionModel>) -> Self {
        Self {
            snapshot,
            collision_model,
            cursor: 0,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Render a report and move on to the geometry of the next link.
    ///
    /// The report is a `cd` element with the collision count, holding a `c` element per collision
    /// and, if the current link has any geometry, an `l` element with a `g` element per geometry.
    pub fn report(&mut self) -> Result<String> {
        let snapshot = *self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        let mut writer = Writer::new(Vec::new());

        let mut root = BytesStart::new("cd");
        root.push_attribute(("col_count", snapshot.collision_count.to_string().as_str()));
        write(&mut writer, Event::Start(root))?;

        for collision in snapshot.collisions.iter_valid() {
            write(&mut writer, Event::Empty(collision_element(collision)))?;
        }

        let link_count = self.collision_model.link_count();
        if link_count > 0 {
            self.write_link(&mut writer)?;
            self.cursor = (self.cursor + 1) % link_count;
        }

        write(&mut writer, Event::End(BytesEnd::new("cd")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| Error::Diagnostics(e.to_string()))
    }

    fn write_link(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let collisions = self.collision_model.link_collisions(self.cursor);
        if collisions.is_empty() {
            return Ok(());
        }

        let mut link = BytesStart::new("l");
        push(&mut link, "idx", self.cursor);
        link.push_attribute((
            "name",
            self.collision_model.link_name(self.cursor).unwrap_or_default(),
        ));
        write(writer, Event::Start(link))?;

        for collision in collisions {
            let translation = collision.origin.translation.vector;
            let rotation = collision.origin.rotation;

            let mut element = BytesStart::new("g");
            push(&mut element, "x", translation.x);
            push(&mut element, "y", translation.y);
            push(&mut element, "z", translation.z);
            push(&mut element, "qx", rotation.i);
            push(&mut element, "qy", rotation.j);
            push(&mut element, "qz", rotation.k);
            push(&mut element, "qw", rotation.w);

            match &collision.geometry {
                Geometry::Undefined => element.push_attribute(("type", "UNDEFINED")),
                Geometry::Capsule { radius, length } => {
                    element.push_attribute(("type", "CAPSULE"));
                    push(&mut element, "r", radius);
                    push(&mut element, "l", length);
                }
                Geometry::Sphere { radius } => {
                    element.push_attribute(("type", "SPHERE"));
                    push(&mut element, "r", radius);
                }
                Geometry::Convex { .. } => element.push_attribute(("type", "CONVEX")),
                Geometry::TriangleMesh { .. } => element.push_attribute(("type", "TRIANGLE")),
                Geometry::Octomap => element.push_attribute(("type", "OCTOMAP")),
            }

            write(writer, Event::Empty(element))?;
        }

        write(writer, Event::End(BytesEnd::new("l")))
    }
}

fn collision_element(collision: &CollisionInfo) -> BytesStart<'static> {
    let mut element = BytesStart::new("c");
    push(&mut element, "i1", collision.link1_idx);
    push(&mut element, "i2", collision.link2_idx);
    push(&mut element, "p1x", collision.p1.x);
    push(&mut element, "p1y", collision.p1.y);
    push(&mut element, "p1z", collision.p1.z);
    push(&mut element, "p2x", collision.p2.x);
    push(&mut element, "p2y", collision.p2.y);
    push(&mut element, "p2z", collision.p2.z);
    push(&mut element, "d", collision.dist);
    push(&mut element, "n1x", collision.n1.x);
    push(&mut element, "n1y", collision.n1.y);
    push(&mut element, "n1z", collision.n1.z);
    push(&mut element, "n2x", collision.n2.x);
    push(&mut element, "n2y", collision.n2.y);
    push(&mut element, "n2z", collision.n2.z);
    element
}

fn push(element: &mut BytesStart, name: &str, value: impl Display) {
    element.push_attribute((name, value.to_string().as_str()));
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Diagnostics(e.to_string()))
}
