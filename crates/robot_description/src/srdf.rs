//! Reader for the `disable_collisions` entries of an SRDF document.

use quick_xml::events::Event;

use crate::xml::{self, attribute};
use crate::{Error, Result};

/// Semantic information layered on top of a [`RobotDescription`](crate::RobotDescription).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticDescription {
    /// Link pairs that must never be checked against each other.
    pub disabled_collisions: Vec<(String, String)>,
}

impl SemanticDescription {
    /// Whether collision checking between `a` and `b` is disabled, in either order.
    #[must_use]
    pub fn is_disabled(&self, a: &str, b: &str) -> bool {
        self.disabled_collisions
            .iter()
            .any(|(l1, l2)| (l1 == a && l2 == b) || (l1 == b && l2 == a))
    }
}

/// Parse an SRDF document.
pub fn parse_srdf(xml: &str) -> Result<SemanticDescription> {
    let mut reader = xml::reader(xml);
    let mut semantic = SemanticDescription::default();
    let mut seen_robot = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.name().as_ref() {
                b"robot" => seen_robot = true,
                b"disable_collisions" => semantic
                    .disabled_collisions
                    .push((attribute(e, "link1")?, attribute(e, "link2")?)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    if !seen_robot {
        return Err(Error::missing_element("robot", "SRDF document"));
    }

    Ok(semantic)
}
