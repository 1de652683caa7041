//! Model interchange formats for TREsPASS models.
//!
//! - **XML** - the TREsPASS model document format (lossless both ways)
//! - **JSON** / **YAML** - dumps of the canonical model
//!
//! ## Architecture
//!
//! XML goes through an intermediate [`Document`] tree. The codec only maps
//! text to tree; the import and export passes own every context-sensitive
//! decision (list coercion, attribute placement, string splitting).
//!
//! ```text
//!   XML text ──decode──▶ Document ──import::normalize──▶ Model
//!   XML text ◀─encode─── Document ◀──export::prepare──── Model
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use trespass::interchange::{self, ModelFormat, Xml};
//!
//! let model = interchange::parse(&std::fs::read_to_string("model.xml")?)?;
//! let xml = Xml::new().write(&model.with_title("Office"))?;
//! ```

mod error;
pub mod export;
mod format;
pub mod import;
mod json;
pub mod tree;
mod xml;
mod yaml;

pub use error::InterchangeError;
pub use format::ModelFormat;
pub use json::Json;
pub use tree::{Document, Element, Node, TEXT_KEY};
pub use xml::{Xml, XmlOptions, decode, encode};
pub use yaml::Yaml;

use crate::model::{Model, Scenario};

/// Parse a TREsPASS model XML document.
pub fn parse(text: &str) -> Result<Model, InterchangeError> {
    Xml::new().read(text.as_bytes())
}

/// Render a model as TREsPASS XML with default options.
///
/// Fails if the model has no id.
pub fn to_xml(model: &Model) -> Result<String, InterchangeError> {
    let bytes = Xml::new().write(model)?;
    String::from_utf8(bytes).map_err(|e| InterchangeError::xml(e.to_string()))
}

/// Render a scenario as TREsPASS XML with default options.
pub fn scenario_to_xml(scenario: &Scenario) -> Result<String, InterchangeError> {
    let bytes = Xml::new().write_scenario(scenario)?;
    String::from_utf8(bytes).map_err(|e| InterchangeError::xml(e.to_string()))
}

/// Supported file extensions for interchange formats.
pub fn supported_extensions() -> &'static [&'static str] {
    &["xml", "json", "yaml", "yml"]
}

/// Detect format from file extension.
pub fn detect_format(path: &std::path::Path) -> Option<Box<dyn ModelFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "xml" => Some(Box::new(Xml::new())),
        "json" => Some(Box::new(Json)),
        "yaml" | "yml" => Some(Box::new(Yaml)),
        _ => None,
    }
}

/// Detect format from MIME type.
pub fn detect_format_from_mime(mime: &str) -> Option<Box<dyn ModelFormat>> {
    match mime {
        "application/xml" | "text/xml" => Some(Box::new(Xml::new())),
        "application/json" => Some(Box::new(Json)),
        "application/x-yaml" | "text/yaml" => Some(Box::new(Yaml)),
        _ => None,
    }
}
