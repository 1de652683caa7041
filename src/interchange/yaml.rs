//! YAML dump of the canonical model.
//!
//! Same structure as the [JSON dump](super::Json), in YAML syntax.
//!
//! ```yaml
//! system:
//!   author: trespass.js
//!   title: Office
//!   id: model-1
//! locations:
//! - id: hall
//! - id: desk
//!   atLocations:
//!   - hall
//! ```

use super::{InterchangeError, ModelFormat};
use crate::model::Model;

/// YAML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl ModelFormat for Yaml {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/x-yaml"
    }

    fn read(&self, input: &[u8]) -> Result<Model, InterchangeError> {
        #[cfg(feature = "yaml")]
        {
            let model: Model = serde_yaml::from_slice(input)
                .map_err(|e| InterchangeError::yaml(e.to_string()))?;
            Ok(model.normalized())
        }
        #[cfg(not(feature = "yaml"))]
        {
            let _ = input;
            Err(InterchangeError::Unsupported(
                "YAML reading requires the 'yaml' feature".to_string(),
            ))
        }
    }

    fn write(&self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        #[cfg(feature = "yaml")]
        {
            serde_yaml::to_string(model)
                .map(String::into_bytes)
                .map_err(|e| InterchangeError::yaml(e.to_string()))
        }
        #[cfg(not(feature = "yaml"))]
        {
            let _ = model;
            Err(InterchangeError::Unsupported(
                "YAML writing requires the 'yaml' feature".to_string(),
            ))
        }
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let content = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::yaml(format!("Invalid UTF-8: {e}")))?;
        if !content.contains("system:") {
            return Err(InterchangeError::yaml("Missing `system` mapping"));
        }
        Ok(())
    }
}
