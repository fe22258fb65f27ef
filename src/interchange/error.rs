//! Error type of the XML codec.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted trees.
#[derive(Debug, Error)]
pub enum XmlError {
    /// XML syntax error from the underlying parser.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown element tag.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// A child element does not match any field of its parent.
    #[error("element {child} is not a field of {parent}")]
    UnknownField { parent: String, child: String },

    /// Missing required element or attribute.
    #[error("missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid attribute value.
    #[error("invalid {what}: {value}")]
    Invalid { what: &'static str, value: String },

    /// A single-child field carrying several elements.
    #[error("field {0} carries more than one child")]
    SlotOverflow(String),

    /// The document has no root element.
    #[error("empty document")]
    EmptyDocument,
}

impl XmlError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::Missing { kind: "attribute", name: name.into() }
    }

    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing { kind: "element", name: name.into() }
    }

    pub fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid { what, value: value.into() }
    }
}

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        XmlError::Xml(e.to_string())
    }
}
