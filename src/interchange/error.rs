//! Errors raised while importing, exporting or building TREsPASS models.
//!
//! Validation problems are not errors; see [`crate::model::validate`].

use thiserror::Error;

/// Failure of a model import, export or builder call.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// Malformed model XML, or the writer failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON dump or embedded `anm_data` could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML dump could not be (de)serialized.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Reading or writing a model file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A precondition failed: no `<system>` root, or no model/scenario id on
    /// export.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Builder call named a collection outside the registry.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Format compiled out (e.g. YAML without the `yaml` feature).
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl InterchangeError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    pub fn yaml(message: impl Into<String>) -> Self {
        Self::Yaml(message.into())
    }

    /// Missing document element, e.g. the `system` root.
    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "element",
            name: name.into(),
        }
    }

    /// Missing required attribute, e.g. `system id`.
    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "attribute",
            name: name.into(),
        }
    }
}
