//! Attribute helpers shared by the URDF and SRDF readers.

use std::io::BufRead;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{Error, Result};

pub(crate) fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

pub(crate) fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

pub(crate) fn attribute_opt(e: &BytesStart, name: &'static str) -> Result<Option<String>> {
    let Some(attr) = e
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
    else {
        return Ok(None);
    };

    attr.unescape_value()
        .map(|value| Some(value.into_owned()))
        .map_err(|_| Error::InvalidAttribute {
            attribute: name,
            element: element_name(e),
            value: String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

pub(crate) fn attribute(e: &BytesStart, name: &'static str) -> Result<String> {
    attribute_opt(e, name)?.ok_or_else(|| Error::MissingAttribute {
        attribute: name,
        element: element_name(e),
    })
}

pub(crate) fn float_attribute(e: &BytesStart, name: &'static str) -> Result<f64> {
    let value = attribute(e, name)?;
    value.trim().parse().map_err(|_| Error::InvalidAttribute {
        attribute: name,
        element: element_name(e),
        value,
    })
}

/// A float attribute that must be finite and greater than zero, like a size or radius.
pub(crate) fn positive_attribute(e: &BytesStart, name: &'static str) -> Result<f64> {
    let value = float_attribute(e, name)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidAttribute {
            attribute: name,
            element: element_name(e),
            value: value.to_string(),
        })
    }
}

pub(crate) fn vector_attribute(e: &BytesStart, name: &'static str) -> Result<Option<Vector3<f64>>> {
    let Some(value) = attribute_opt(e, name)? else {
        return Ok(None);
    };

    let invalid = || Error::InvalidAttribute {
        attribute: name,
        element: element_name(e),
        value: value.clone(),
    };

    let parts = value
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    match parts.as_slice() {
        [x, y, z] => Ok(Some(Vector3::new(*x, *y, *z))),
        _ => Err(invalid()),
    }
}

/// Parses an `<origin xyz=".." rpy=".."/>` element, both attributes default to zero.
///
/// `rpy` is a fixed-axis roll, pitch, yaw rotation.
pub(crate) fn origin(e: &BytesStart) -> Result<Isometry3<f64>> {
    let xyz = vector_attribute(e, "xyz")?.unwrap_or_else(Vector3::zeros);
    let rpy = vector_attribute(e, "rpy")?.unwrap_or_else(Vector3::zeros);

    Ok(Isometry3::from_parts(
        Translation3::from(xyz),
        UnitQuaternion::from_euler_angles(rpy.x, rpy.y, rpy.z),
    ))
}

/// Skip an element and all its children.
pub(crate) fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => depth += 1,
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(())
}
