//! Result and Error types for the crate.
use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Description parsing error variants.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The document is not well-formed XML.
    #[error("failed to parse description XML: {0}")]
    Xml(String),

    #[error("missing required element `{element}` in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    #[error("missing required attribute `{attribute}` on `{element}`")]
    MissingAttribute {
        attribute: &'static str,
        element: String,
    },

    #[error("invalid value `{value}` for attribute `{attribute}` on `{element}`")]
    InvalidAttribute {
        attribute: &'static str,
        element: String,
        value: String,
    },

    #[error("unknown joint type `{kind}` for joint `{joint}`")]
    #[diagnostic(help("supported joint types are revolute, continuous, prismatic and fixed"))]
    UnknownJointType { joint: String, kind: String },

    #[error("joint `{0}` has a zero-length axis")]
    ZeroAxis(String),
}

impl Error {
    pub(crate) fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }
}
