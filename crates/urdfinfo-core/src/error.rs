//! Errors raised while loading a URDF document

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The input is not well-formed XML or has no usable root element.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// A required attribute is absent from a `link`, `joint`, `parent` or `child` element.
    #[error("missing required attribute '{attribute}' on <{tag}>{}", describe_owner(.owner))]
    MissingRequiredAttribute {
        /// Tag of the offending element
        tag: String,
        /// Name of the link or joint the element belongs to, when known
        owner: Option<String>,
        attribute: &'static str,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    pub(crate) fn missing_attribute(
        tag: impl Into<String>,
        owner: Option<&str>,
        attribute: &'static str,
    ) -> Self {
        Self::MissingRequiredAttribute {
            tag: tag.into(),
            owner: owner.map(str::to_string),
            attribute,
        }
    }

    /// True for the two document-level failure kinds (as opposed to IO).
    pub fn is_document_error(&self) -> bool {
        !matches!(self, Self::IoError(_))
    }
}

fn describe_owner(owner: &Option<String>) -> String {
    match owner {
        Some(name) => format!(" (in '{}')", name),
        None => String::new(),
    }
}
